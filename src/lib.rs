//! Postcall: serve typed Rust functions over JSON POST requests
//!
//! A caller POSTs a JSON array of arguments. Each element is coerced to
//! the matching parameter type of a bound function, the function runs,
//! and its result is written back as JSON.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Endpoint                   │
//! │                                         │
//! │  value    - Dynamic, ValueType, Value   │
//! │  binding  - bind, coerce, invoke, reply │
//! │  server   - named endpoints on a router │
//! │                                         │
//! ├─────────────────────────────────────────┤
//! │            HTTP (http / axum)           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Binding
//!
//! Any function whose parameters are [`Typed`] (optionally led by a
//! [`Context`]) and which returns `Result<T, E>` or `Result<(), E>` can
//! be bound:
//!
//! ```ignore
//! use postcall::{Endpoint, Typed};
//!
//! #[derive(Typed)]
//! struct Greeting {
//!     #[typed(rename = "who")]
//!     name: String,
//! }
//!
//! let hello = Endpoint::bind("hello", |g: Greeting| -> Result<String, String> {
//!     Ok(format!("hello, {}", g.name))
//! })?;
//! ```
//!
//! `POST ["world"]` to a function of `(String)` answers `"hello, world"`;
//! mismatched arguments answer 400 with a message naming the argument.

extern crate self as postcall;

pub mod binding;
pub mod error;
pub mod server;
pub mod value;

pub use binding::{
    Bindable, CallResult, Context, Endpoint, Json, Outcome, Param, Reply, ReturnArity, Signature,
};
pub use error::{BindError, CoercionError, RequestError};
pub use server::Registry;
pub use value::{
    record_type, ConversionError, Dynamic, Field, FunctionType, RecordFields, RecordType, TypeDef,
    Typed, Value, ValueType,
};

pub use postcall_derive::Typed;
