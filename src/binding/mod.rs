//! Function binding
//!
//! An [`Endpoint`] is a function bound once and then served for every
//! request:
//!
//! ```text
//! Received -> Decoded -> Coerced -> Invoked -> Responded
//!                |           |
//!                +-----------+--> Responded(error)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let add = Endpoint::bind("add", |a: isize, b: f64, c: u8| -> Result<f64, Infallible> {
//!     Ok(a as f64 + b + c as f64)
//! })?;
//!
//! let response = add.handle(request);
//! ```

mod coerce;
mod decode;
mod invoke;
mod response;
mod signature;

pub use coerce::{coerce_argument, coerce_arguments};
pub use decode::decode_arguments;
pub use invoke::{Arguments, Bindable, CallResult, Context, Json, Outcome, Param, Reply};
pub use response::{encode_error, encode_response};
pub use signature::{ReturnArity, Signature};

use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, Response};

use crate::error::{BindError, RequestError};
use crate::value::{TypeDef, Value};

/// Type-erased call into a bound function.
trait Invoke: Send + Sync {
    fn invoke(&self, ctx: &Context, args: Vec<Value>) -> Result<CallResult, RequestError>;
}

/// Wrapper that remembers which [`Bindable`] implementation to call.
struct TypedFn<F, M> {
    func: F,
    _marker: PhantomData<fn() -> M>,
}

impl<F, M> Invoke for TypedFn<F, M>
where
    F: Bindable<M>,
    M: 'static,
{
    fn invoke(&self, ctx: &Context, args: Vec<Value>) -> Result<CallResult, RequestError> {
        <F as Bindable<M>>::invoke(&self.func, ctx, args)
    }
}

/// A closure over coerced values, bound against a hand-written schema.
struct RawFn<F>(F);

impl<F> Invoke for RawFn<F>
where
    F: Fn(&Context, Vec<Value>) -> CallResult + Send + Sync,
{
    fn invoke(&self, ctx: &Context, args: Vec<Value>) -> Result<CallResult, RequestError> {
        Ok((self.0)(ctx, args))
    }
}

struct Inner {
    name: String,
    signature: Signature,
    func: Box<dyn Invoke>,
}

/// A bound function, ready to serve requests.
///
/// Cloning is cheap; clones share the same signature and function.
#[derive(Clone)]
pub struct Endpoint {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.inner.name)
            .field("signature", &self.inner.signature)
            .finish_non_exhaustive()
    }
}

impl Endpoint {
    /// Bind a typed Rust function.
    pub fn bind<F, M>(name: impl Into<String>, func: F) -> Result<Self, BindError>
    where
        F: Bindable<M>,
        M: 'static,
    {
        let def = TypeDef::Function(<F as Bindable<M>>::function_type());
        Self::new(
            name.into(),
            &def,
            Box::new(TypedFn {
                func,
                _marker: PhantomData,
            }),
        )
    }

    /// Like [`Endpoint::bind`], but a bad binding aborts.
    ///
    /// For call sites that treat a bad binding as a startup defect.
    pub fn must_bind<F, M>(name: impl Into<String>, func: F) -> Self
    where
        F: Bindable<M>,
        M: 'static,
    {
        match Self::bind(name, func) {
            Ok(endpoint) => endpoint,
            Err(err) => panic!("postcall: bind failed with: {}", err),
        }
    }

    /// Bind a closure over coerced values against an explicit type
    /// definition.
    ///
    /// The closure receives one [`Value`] per caller-supplied parameter,
    /// already coerced to the declared types.
    pub fn from_schema<F>(name: impl Into<String>, def: &TypeDef, func: F) -> Result<Self, BindError>
    where
        F: Fn(&Context, Vec<Value>) -> CallResult + Send + Sync + 'static,
    {
        Self::new(name.into(), def, Box::new(RawFn(func)))
    }

    fn new(name: String, def: &TypeDef, func: Box<dyn Invoke>) -> Result<Self, BindError> {
        let signature = Signature::bind(def)?;

        tracing::debug!(
            endpoint = %name,
            params = signature.params().len(),
            context = signature.wants_context(),
            returns = ?signature.returns(),
            "bound function"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                name,
                signature,
                func,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    /// Serve one request.
    #[tracing::instrument(level = "debug", skip_all, fields(endpoint = %self.inner.name))]
    pub fn handle(&self, request: Request<Bytes>) -> Response<String> {
        let (parts, body) = request.into_parts();

        if parts.method != Method::POST {
            return reject(RequestError::MethodNotAllowed);
        }

        let ctx = Context::new(parts);
        match self.call(&ctx, &body) {
            Ok(result) => encode_response(&self.inner.signature, result),
            Err(err) => reject(err),
        }
    }

    /// Decode, coerce and invoke, without producing a response.
    pub fn call(&self, ctx: &Context, body: &[u8]) -> Result<CallResult, RequestError> {
        let signature = &self.inner.signature;
        let args = decode_arguments(body, signature)?;
        let values = coerce_arguments(args, signature)?;
        self.inner.func.invoke(ctx, values)
    }
}

fn reject(err: RequestError) -> Response<String> {
    match &err {
        RequestError::Malformed(source) => {
            tracing::debug!(%source, "rejected request: {}", err)
        }
        _ => tracing::debug!("rejected request: {}", err),
    }
    encode_error(&err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FunctionType, ValueType};
    use http::StatusCode;
    use std::convert::Infallible;

    fn post(body: &'static str) -> Request<Bytes> {
        Request::builder()
            .method("POST")
            .uri("/")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    #[test]
    fn test_rejects_non_post() {
        let endpoint = Endpoint::must_bind("noop", || -> Result<(), Infallible> { Ok(()) });
        let request = Request::builder()
            .method("GET")
            .uri("/")
            .body(Bytes::new())
            .unwrap();

        let response = endpoint.handle(request);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), "\"only POST requests are permitted\"\n");
    }

    #[test]
    fn test_malformed_body() {
        let endpoint = Endpoint::must_bind("noop", || -> Result<(), Infallible> { Ok(()) });
        let response = endpoint.handle(post("{"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), "\"malformed arguments\"\n");
    }

    #[test]
    fn test_argument_count_mismatch() {
        let endpoint = Endpoint::must_bind("one", |_: isize| -> Result<(), Infallible> { Ok(()) });
        let response = endpoint.handle(post("[1, 2]"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), "\"number of arguments mismatch\"\n");
    }

    #[test]
    fn test_from_schema_rejects_non_function() {
        let err = Endpoint::from_schema("value", &TypeDef::Value(ValueType::Isize), |_, _| {
            CallResult::empty()
        })
        .unwrap_err();
        assert_eq!(err, BindError::NotAFunction);
        assert_eq!(err.to_string(), "fn wasn't a function");
    }

    #[test]
    fn test_from_schema_serves_values() {
        let def = TypeDef::Function(FunctionType::new(
            vec![ValueType::U8, ValueType::U8],
            vec![ValueType::U16, ValueType::Error],
        ));
        let endpoint = Endpoint::from_schema("sum", &def, |_, args| {
            let sum: u16 = args
                .iter()
                .map(|v| match v {
                    Value::U8(n) => u16::from(*n),
                    _ => 0,
                })
                .sum();
            CallResult::payload(serde_json::json!(sum))
        })
        .unwrap();

        let response = endpoint.handle(post("[200, 100]"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "300\n");
    }

    #[test]
    #[should_panic(
        expected = "postcall: bind failed with: parameter 2 has type ptr, which can't be decoded from arguments"
    )]
    fn test_must_bind_panics_on_second_context() {
        Endpoint::must_bind("twice", |_: Context, _: Context| -> Result<(), Infallible> {
            Ok(())
        });
    }

    #[test]
    fn test_endpoint_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Endpoint>();
        assert_send_sync::<Signature>();
    }
}
