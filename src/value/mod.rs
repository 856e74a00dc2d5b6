//! Value model
//!
//! - [`Dynamic`]: what the caller sent, decoded without a schema
//! - [`ValueType`]: what a bound function expects
//! - [`Value`]: a caller value after coercion to a [`ValueType`]

mod dynamic;
mod typed;
mod types;

pub use dynamic::Dynamic;
pub use typed::{record_type, ConversionError, RecordFields, Typed, Value};
pub use types::{Field, FunctionType, RecordType, TypeDef, ValueType};
