//! Invoking bound functions
//!
//! A Rust function becomes bindable when every parameter implements
//! [`Param`] and it returns `Result<T, E>` with `T: Reply` (two return
//! values) or `Result<(), E>` (error only), `E: Display`.
//!
//! ```ignore
//! fn add(a: isize, b: f64, c: u8) -> Result<f64, Infallible> {
//!     Ok(a as f64 + b + c as f64)
//! }
//!
//! fn whoami(ctx: Context, greeting: String) -> Result<String, String> {
//!     let user = ctx.header("X-User").ok_or("no user")?;
//!     Ok(format!("{greeting}, {user}"))
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::sync::Arc;

use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use serde::Serialize;

use crate::error::RequestError;
use crate::value::{Dynamic, FunctionType, Typed, Value, ValueType};

/// The ambient request a bound function may ask for as its first
/// parameter.
#[derive(Debug, Clone)]
pub struct Context {
    parts: Arc<Parts>,
}

impl Context {
    pub fn new(parts: Parts) -> Self {
        Self {
            parts: Arc::new(parts),
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// A header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The outcome of one call: a payload, an error message, or neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallResult {
    pub payload: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl CallResult {
    /// No payload, no error.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn payload(payload: serde_json::Value) -> Self {
        Self {
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            payload: None,
            error: Some(message.into()),
        }
    }
}

/// Coerced arguments, handed out in declaration order.
pub struct Arguments {
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// The next argument and its 1-based position.
    pub fn next_value(&mut self) -> (usize, Option<Value>) {
        self.position += 1;
        (self.position, self.values.next())
    }
}

/// A parameter of a bindable function.
pub trait Param: Sized {
    fn param_type() -> ValueType;

    fn extract(ctx: &Context, args: &mut Arguments) -> Result<Self, RequestError>;
}

impl<T: Typed> Param for T {
    fn param_type() -> ValueType {
        T::value_type()
    }

    fn extract(_ctx: &Context, args: &mut Arguments) -> Result<Self, RequestError> {
        let (index, value) = args.next_value();
        let value = value.ok_or(RequestError::Conversion {
            index,
            source: crate::value::ConversionError::MissingIndex(index),
        })?;
        T::from_value(value).map_err(|source| RequestError::Conversion { index, source })
    }
}

impl Param for Context {
    fn param_type() -> ValueType {
        ValueType::Context
    }

    fn extract(ctx: &Context, _args: &mut Arguments) -> Result<Self, RequestError> {
        Ok(ctx.clone())
    }
}

/// A payload type a bound function may return next to its error.
pub trait Reply: Serialize {
    fn reply_type() -> ValueType;
}

macro_rules! impl_reply_typed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reply for $ty {
                fn reply_type() -> ValueType {
                    <$ty as Typed>::value_type()
                }
            }
        )*
    };
}

impl_reply_typed!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, Dynamic,
    serde_json::Value,
);

impl<T: Reply> Reply for Vec<T> {
    fn reply_type() -> ValueType {
        ValueType::List(Box::new(T::reply_type()))
    }
}

impl<T: Reply> Reply for Option<T> {
    fn reply_type() -> ValueType {
        ValueType::Option(Box::new(T::reply_type()))
    }
}

impl<T: Reply> Reply for HashMap<String, T> {
    fn reply_type() -> ValueType {
        ValueType::Map(Box::new(T::reply_type()))
    }
}

impl<T: Reply> Reply for BTreeMap<String, T> {
    fn reply_type() -> ValueType {
        ValueType::Map(Box::new(T::reply_type()))
    }
}

/// Reply with any serializable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Serialize for Json<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T: Serialize> Reply for Json<T> {
    fn reply_type() -> ValueType {
        ValueType::Any
    }
}

/// What a bindable function returns.
pub trait Outcome {
    fn results() -> Vec<ValueType>;

    fn into_call_result(self) -> Result<CallResult, RequestError>;
}

impl<E: Display> Outcome for Result<(), E> {
    fn results() -> Vec<ValueType> {
        vec![ValueType::Error]
    }

    fn into_call_result(self) -> Result<CallResult, RequestError> {
        Ok(match self {
            Ok(()) => CallResult::empty(),
            Err(e) => CallResult::failed(e.to_string()),
        })
    }
}

impl<T: Reply, E: Display> Outcome for Result<T, E> {
    fn results() -> Vec<ValueType> {
        vec![T::reply_type(), ValueType::Error]
    }

    fn into_call_result(self) -> Result<CallResult, RequestError> {
        match self {
            Ok(value) => serde_json::to_value(&value)
                .map(CallResult::payload)
                .map_err(RequestError::Encode),
            Err(e) => Ok(CallResult::failed(e.to_string())),
        }
    }
}

/// A function that can be bound as an endpoint.
///
/// `Marker` is the tuple of parameter types; it only exists to keep the
/// per-arity implementations apart.
pub trait Bindable<Marker>: Send + Sync + 'static {
    fn function_type() -> FunctionType;

    fn invoke(&self, ctx: &Context, args: Vec<Value>) -> Result<CallResult, RequestError>;
}

macro_rules! impl_bindable {
    ($($p:ident),*) => {
        impl<F, O, $($p,)*> Bindable<($($p,)*)> for F
        where
            F: Fn($($p),*) -> O + Send + Sync + 'static,
            O: Outcome,
            $($p: Param,)*
        {
            fn function_type() -> FunctionType {
                FunctionType::new(vec![$($p::param_type()),*], O::results())
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, ctx: &Context, args: Vec<Value>) -> Result<CallResult, RequestError> {
                let mut args = Arguments::new(args);
                $(let $p = $p::extract(ctx, &mut args)?;)*
                (self)($($p),*).into_call_result()
            }
        }
    };
}

impl_bindable!();
impl_bindable!(A1);
impl_bindable!(A1, A2);
impl_bindable!(A1, A2, A3);
impl_bindable!(A1, A2, A3, A4);
impl_bindable!(A1, A2, A3, A4, A5);
impl_bindable!(A1, A2, A3, A4, A5, A6);
impl_bindable!(A1, A2, A3, A4, A5, A6, A7);
impl_bindable!(A1, A2, A3, A4, A5, A6, A7, A8);
