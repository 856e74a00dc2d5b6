//! Static type descriptors
//!
//! A [`ValueType`] is the schema-side description of one parameter or
//! return slot. Bound functions are described by a [`FunctionType`]; the
//! binder only accepts a [`TypeDef::Function`].

use std::collections::BTreeMap;

use super::{Dynamic, Value};

/// Static type of a parameter, return slot, record field or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    S8,
    S16,
    S32,
    S64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    /// Nilable wrapper around another type.
    Option(Box<ValueType>),
    List(Box<ValueType>),
    /// String-keyed map.
    Map(Box<ValueType>),
    Record(RecordType),
    /// Accepts any caller value unchanged.
    Any,
    /// The ambient request context. Only valid as the first parameter.
    Context,
    /// An error-capable return slot.
    Error,
}

impl ValueType {
    /// Kind name used in mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::S8 => "int8",
            ValueType::S16 => "int16",
            ValueType::S32 => "int32",
            ValueType::S64 => "int64",
            ValueType::Isize => "int",
            ValueType::U8 => "uint8",
            ValueType::U16 => "uint16",
            ValueType::U32 => "uint32",
            ValueType::U64 => "uint64",
            ValueType::Usize => "uint",
            ValueType::F32 => "float32",
            ValueType::F64 => "float64",
            ValueType::String => "string",
            ValueType::Option(_) | ValueType::Context => "ptr",
            ValueType::List(_) => "slice",
            ValueType::Map(_) => "map",
            ValueType::Record(_) => "struct",
            ValueType::Any => "interface",
            ValueType::Error => "error",
        }
    }

    /// Whether a `null` argument is acceptable for this type.
    pub fn is_nilable(&self) -> bool {
        matches!(
            self,
            ValueType::Option(_) | ValueType::List(_) | ValueType::Map(_)
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::S8
                | ValueType::S16
                | ValueType::S32
                | ValueType::S64
                | ValueType::Isize
                | ValueType::U8
                | ValueType::U16
                | ValueType::U32
                | ValueType::U64
                | ValueType::Usize
                | ValueType::F32
                | ValueType::F64
        )
    }

    /// Whether values of this type can be produced from caller data.
    ///
    /// `Context` and `Error` can't, wherever they are nested.
    pub fn is_decodable(&self) -> bool {
        match self {
            ValueType::Context | ValueType::Error => false,
            ValueType::Option(inner) | ValueType::List(inner) | ValueType::Map(inner) => {
                inner.is_decodable()
            }
            ValueType::Record(record) => record.fields.iter().all(|f| f.ty.is_decodable()),
            _ => true,
        }
    }

    /// The zero value of this type.
    ///
    /// `Context` and `Error` are nil pointers; the binder keeps them out of
    /// anything that gets decoded.
    pub fn zero(&self) -> Value {
        match self {
            ValueType::Bool => Value::Bool(false),
            ValueType::S8 => Value::S8(0),
            ValueType::S16 => Value::S16(0),
            ValueType::S32 => Value::S32(0),
            ValueType::S64 => Value::S64(0),
            ValueType::Isize => Value::Isize(0),
            ValueType::U8 => Value::U8(0),
            ValueType::U16 => Value::U16(0),
            ValueType::U32 => Value::U32(0),
            ValueType::U64 => Value::U64(0),
            ValueType::Usize => Value::Usize(0),
            ValueType::F32 => Value::F32(0.0),
            ValueType::F64 => Value::F64(0.0),
            ValueType::String => Value::String(String::new()),
            ValueType::Option(_) | ValueType::Context | ValueType::Error => Value::Option(None),
            ValueType::List(_) => Value::List(Vec::new()),
            ValueType::Map(_) => Value::Map(BTreeMap::new()),
            ValueType::Record(record) => Value::Record(
                record
                    .fields
                    .iter()
                    .map(|f| (f.name.clone(), f.ty.zero()))
                    .collect(),
            ),
            ValueType::Any => Value::Any(Dynamic::Null),
        }
    }
}

/// A structure type: named fields, each with an optional external key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<Field>,
}

impl RecordType {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// One field of a [`RecordType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Name of the field on the Rust side.
    pub name: String,
    /// Key the caller uses for this field, if it differs from `name`.
    pub rename: Option<String>,
    pub ty: ValueType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            rename: None,
            ty,
        }
    }

    pub fn rename(mut self, key: impl Into<String>) -> Self {
        self.rename = Some(key.into());
        self
    }

    /// The key this field is read from in a caller-supplied mapping.
    pub fn key(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

/// Parameter and return types of a callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
}

impl FunctionType {
    pub fn new(params: Vec<ValueType>, results: Vec<ValueType>) -> Self {
        Self { params, results }
    }
}

/// Anything that can be offered to the binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Function(FunctionType),
    Value(ValueType),
}

impl From<FunctionType> for TypeDef {
    fn from(function: FunctionType) -> Self {
        TypeDef::Function(function)
    }
}

impl From<ValueType> for TypeDef {
    fn from(ty: ValueType) -> Self {
        TypeDef::Value(ty)
    }
}
