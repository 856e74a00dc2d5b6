//! Coercion engine
//!
//! Matches each untyped argument against its parameter type. Rules, first
//! match wins:
//!
//! 1. `null` gives the zero value of a nilable type and is rejected
//!    otherwise. Nested inside a record, list or map, `null` always gives
//!    the zero value.
//! 2. A mapping decodes into a record field by field (by external key,
//!    then case-insensitively), or into a map entry by entry.
//! 3. A sequence decodes into a list element by element.
//! 4. A number converts to any integer or float width with an `as` cast.
//! 5. Booleans and strings pass through to the same kind; anything passes
//!    through to `Any`.
//! 6. Everything else is a mismatch.

use std::collections::BTreeMap;
use std::fmt;

use super::Signature;
use crate::error::CoercionError;
use crate::value::{Dynamic, RecordType, Value, ValueType};

/// Coerce every argument against the signature, stopping at the first
/// failure.
pub fn coerce_arguments(args: Vec<Dynamic>, signature: &Signature) -> Result<Vec<Value>, CoercionError> {
    args.into_iter()
        .zip(signature.params())
        .enumerate()
        .map(|(i, (arg, expected))| coerce_argument(i + 1, arg, expected))
        .collect()
}

/// Coerce the argument at 1-based position `index`.
pub fn coerce_argument(index: usize, arg: Dynamic, expected: &ValueType) -> Result<Value, CoercionError> {
    if arg.is_null() {
        if expected.is_nilable() {
            return Ok(expected.zero());
        }
        return Err(CoercionError::Null { index });
    }

    coerce_value(arg, expected).map_err(|mismatch| mismatch.at(index))
}

fn coerce_value(arg: Dynamic, expected: &ValueType) -> Result<Value, Mismatch> {
    match (arg, expected) {
        (Dynamic::Null, ty) => Ok(ty.zero()),
        (arg, ValueType::Any) => Ok(Value::Any(arg)),
        (arg, ValueType::Option(inner)) => {
            Ok(Value::Option(Some(Box::new(coerce_value(arg, inner)?))))
        }
        (Dynamic::Map(entries), ValueType::Record(record)) => decode_record(entries, record),
        (Dynamic::Map(entries), ValueType::Map(elem)) => {
            let mut map = BTreeMap::new();
            for (key, value) in entries {
                let value = coerce_value(value, elem)
                    .map_err(|m| m.within(Segment::Field(key.clone())))?;
                map.insert(key, value);
            }
            Ok(Value::Map(map))
        }
        (Dynamic::Seq(items), ValueType::List(elem)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| coerce_value(item, elem).map_err(|m| m.within(Segment::Index(i))))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        (Dynamic::Number(n), ty) if ty.is_numeric() => Ok(convert_number(n, ty)),
        (Dynamic::Bool(b), ValueType::Bool) => Ok(Value::Bool(b)),
        (Dynamic::Text(s), ValueType::String) => Ok(Value::String(s)),
        (arg, ty) => Err(Mismatch::new(arg.kind_name(), ty.kind_name())),
    }
}

fn decode_record(entries: Vec<(String, Dynamic)>, record: &RecordType) -> Result<Value, Mismatch> {
    let mut fields = Vec::with_capacity(record.fields.len());

    for field in &record.fields {
        let value = match find_entry(&entries, field.key()) {
            Some(source) => coerce_value(source.clone(), &field.ty)
                .map_err(|m| m.within(Segment::Field(field.key().to_string())))?,
            None => field.ty.zero(),
        };
        fields.push((field.name.clone(), value));
    }

    Ok(Value::Record(fields))
}

/// The entry for `key`, falling back to a case-insensitive match. Entries
/// are never consumed, so two fields may read the same key. The last
/// duplicate wins.
fn find_entry<'a>(entries: &'a [(String, Dynamic)], key: &str) -> Option<&'a Dynamic> {
    entries
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .or_else(|| entries.iter().rev().find(|(k, _)| eq_fold(k, key)))
        .map(|(_, v)| v)
}

fn eq_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Numeric narrowing is silent: `as` truncates toward zero and saturates.
fn convert_number(n: f64, ty: &ValueType) -> Value {
    match ty {
        ValueType::S8 => Value::S8(n as i8),
        ValueType::S16 => Value::S16(n as i16),
        ValueType::S32 => Value::S32(n as i32),
        ValueType::S64 => Value::S64(n as i64),
        ValueType::Isize => Value::Isize(n as isize),
        ValueType::U8 => Value::U8(n as u8),
        ValueType::U16 => Value::U16(n as u16),
        ValueType::U32 => Value::U32(n as u32),
        ValueType::U64 => Value::U64(n as u64),
        ValueType::Usize => Value::Usize(n as usize),
        ValueType::F32 => Value::F32(n as f32),
        _ => Value::F64(n),
    }
}

enum Segment {
    Field(String),
    Index(usize),
}

/// A mismatch somewhere inside one argument, before its index is known.
struct Mismatch {
    /// Innermost segment first.
    path: Vec<Segment>,
    got: &'static str,
    expected: &'static str,
}

impl Mismatch {
    fn new(got: &'static str, expected: &'static str) -> Self {
        Self {
            path: Vec::new(),
            got,
            expected,
        }
    }

    fn within(mut self, segment: Segment) -> Self {
        self.path.push(segment);
        self
    }

    fn at(self, index: usize) -> CoercionError {
        if self.path.is_empty() {
            return CoercionError::Mismatch {
                index,
                got: self.got,
                expected: self.expected,
            };
        }

        CoercionError::Nested {
            index,
            path: Path(&self.path).to_string(),
            got: self.got,
            expected: self.expected,
        }
    }
}

struct Path<'a>(&'a [Segment]);

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().rev().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}
