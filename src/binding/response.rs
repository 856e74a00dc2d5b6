//! Response encoding
//!
//! Bodies are JSON followed by a newline. Errors are JSON-quoted strings
//! with status 400; a reported error always wins over a payload.

use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use serde::Serialize;

use super::{CallResult, ReturnArity, Signature};
use crate::error::RequestError;

/// Encode the outcome of a completed call.
pub fn encode_response(signature: &Signature, result: CallResult) -> Response<String> {
    if let Some(message) = result.error {
        return encode_error(&RequestError::Failed(message));
    }

    match signature.returns() {
        ReturnArity::Two => {
            let payload = result.payload.unwrap_or(serde_json::Value::Null);
            write_json(StatusCode::OK, &payload)
        }
        ReturnArity::One => empty(StatusCode::OK),
    }
}

/// Encode a failed request.
pub fn encode_error(error: &RequestError) -> Response<String> {
    write_json(StatusCode::BAD_REQUEST, &error.to_string())
}

fn write_json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<String> {
    match serde_json::to_string(body) {
        Ok(mut text) => {
            text.push('\n');
            let mut response = Response::new(text);
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => {
            tracing::warn!(%err, "failed to serialize response body");
            empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn empty(status: StatusCode) -> Response<String> {
    let mut response = Response::new(String::new());
    *response.status_mut() = status;
    response
}
