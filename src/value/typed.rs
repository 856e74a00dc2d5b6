//! Coerced values and their Rust counterparts

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::{Dynamic, Field, RecordType, ValueType};

/// A value that already conforms to a [`ValueType`].
///
/// The coercion engine produces these; [`Typed::from_value`] turns them
/// into the Rust parameter types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    S8(i8),
    S16(i16),
    S32(i32),
    S64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    String(String),
    Option(Option<Box<Value>>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Fields keyed by their Rust name, in declaration order.
    Record(Vec<(String, Value)>),
    Any(Dynamic),
}

impl Value {
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

/// Failure turning a [`Value`] into a Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: &'static str, got: String },

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("missing value at index {0}")]
    MissingIndex(usize),

    #[error("field '{0}': {1}")]
    FieldError(String, Box<ConversionError>),

    #[error("index {0}: {1}")]
    IndexError(usize, Box<ConversionError>),

    #[error("key '{0}': {1}")]
    KeyError(String, Box<ConversionError>),
}

impl ConversionError {
    fn mismatch(expected: &'static str, got: &Value) -> Self {
        ConversionError::TypeMismatch {
            expected,
            got: got.describe(),
        }
    }
}

/// A Rust type with a static [`ValueType`] that can be built from a
/// coerced [`Value`].
///
/// Implemented for primitives, `String`, `Option`, `Vec`, string-keyed
/// maps and [`Dynamic`]. Use `#[derive(Typed)]` for structs.
pub trait Typed: Sized {
    fn value_type() -> ValueType;

    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

macro_rules! impl_typed_primitive {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl Typed for $ty {
                fn value_type() -> ValueType {
                    ValueType::$variant
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::$variant(x) => Ok(x),
                        other => Err(ConversionError::mismatch($name, &other)),
                    }
                }
            }
        )*
    };
}

impl_typed_primitive! {
    bool => Bool, "bool";
    i8 => S8, "i8";
    i16 => S16, "i16";
    i32 => S32, "i32";
    i64 => S64, "i64";
    isize => Isize, "isize";
    u8 => U8, "u8";
    u16 => U16, "u16";
    u32 => U32, "u32";
    u64 => U64, "u64";
    usize => Usize, "usize";
    f32 => F32, "f32";
    f64 => F64, "f64";
    String => String, "String";
}

impl<T: Typed> Typed for Option<T> {
    fn value_type() -> ValueType {
        ValueType::Option(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Option(None) => Ok(None),
            Value::Option(Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(ConversionError::mismatch("Option", &other)),
        }
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    T::from_value(item).map_err(|e| ConversionError::IndexError(i, Box::new(e)))
                })
                .collect(),
            other => Err(ConversionError::mismatch("Vec", &other)),
        }
    }
}

impl<T: Typed> Typed for HashMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| match T::from_value(v) {
                    Ok(v) => Ok((k, v)),
                    Err(e) => Err(ConversionError::KeyError(k, Box::new(e))),
                })
                .collect(),
            other => Err(ConversionError::mismatch("HashMap", &other)),
        }
    }
}

impl<T: Typed> Typed for BTreeMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| match T::from_value(v) {
                    Ok(v) => Ok((k, v)),
                    Err(e) => Err(ConversionError::KeyError(k, Box::new(e))),
                })
                .collect(),
            other => Err(ConversionError::mismatch("BTreeMap", &other)),
        }
    }
}

impl Typed for Dynamic {
    fn value_type() -> ValueType {
        ValueType::Any
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Any(d) => Ok(d),
            other => Err(ConversionError::mismatch("Dynamic", &other)),
        }
    }
}

impl Typed for serde_json::Value {
    fn value_type() -> ValueType {
        ValueType::Any
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Dynamic::from_value(value).map(Into::into)
    }
}

/// Field access for a coerced record, used by `#[derive(Typed)]`.
pub struct RecordFields {
    fields: Vec<(String, Value)>,
}

impl RecordFields {
    pub fn new(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Record(fields) => Ok(Self { fields }),
            other => Err(ConversionError::mismatch("record", &other)),
        }
    }

    /// Remove the field with the given Rust name and convert it.
    pub fn take<T: Typed>(&mut self, name: &str) -> Result<T, ConversionError> {
        let position = self
            .fields
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| ConversionError::MissingField(name.to_string()))?;
        let (_, value) = self.fields.remove(position);
        T::from_value(value).map_err(|e| ConversionError::FieldError(name.to_string(), Box::new(e)))
    }
}

/// Shorthand for building the [`ValueType::Record`] of a derived struct.
pub fn record_type(name: &str, fields: Vec<Field>) -> ValueType {
    ValueType::Record(RecordType::new(name, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_value_types() {
        assert_eq!(isize::value_type(), ValueType::Isize);
        assert_eq!(u8::value_type(), ValueType::U8);
        assert_eq!(String::value_type(), ValueType::String);
        assert_eq!(
            Vec::<Option<f32>>::value_type(),
            ValueType::List(Box::new(ValueType::Option(Box::new(ValueType::F32))))
        );
    }

    #[test]
    fn test_from_value_roundtrip_primitives() {
        assert_eq!(i64::from_value(Value::S64(-4)), Ok(-4));
        assert_eq!(String::from_value(Value::String("x".into())), Ok("x".to_string()));
        assert!(i64::from_value(Value::S32(1)).is_err());
    }

    #[test]
    fn test_option_and_list() {
        assert_eq!(Option::<u16>::from_value(Value::Option(None)), Ok(None));
        assert_eq!(
            Option::<u16>::from_value(Value::Option(Some(Box::new(Value::U16(9))))),
            Ok(Some(9))
        );
        let err = Vec::<bool>::from_value(Value::List(vec![Value::Bool(true), Value::U8(1)]))
            .unwrap_err();
        assert!(matches!(err, ConversionError::IndexError(1, _)));
    }

    #[test]
    fn test_map_conversion() {
        let mut entries = BTreeMap::new();
        entries.insert("k".to_string(), Value::String("v".to_string()));
        let map = HashMap::<String, String>::from_value(Value::Map(entries)).unwrap();
        assert_eq!(map.get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_record_fields_take() {
        let mut fields = RecordFields::new(Value::Record(vec![
            ("a".to_string(), Value::Isize(3)),
            ("b".to_string(), Value::String("s".to_string())),
        ]))
        .unwrap();

        assert_eq!(fields.take::<String>("b"), Ok("s".to_string()));
        assert_eq!(fields.take::<isize>("a"), Ok(3));
        assert_eq!(
            fields.take::<isize>("a"),
            Err(ConversionError::MissingField("a".to_string()))
        );
    }
}
