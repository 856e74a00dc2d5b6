//! Argument decoding

use super::Signature;
use crate::error::RequestError;
use crate::value::Dynamic;

/// Decode a request body into one [`Dynamic`] per expected parameter.
pub fn decode_arguments(body: &[u8], signature: &Signature) -> Result<Vec<Dynamic>, RequestError> {
    let args: Vec<Dynamic> = serde_json::from_slice(body).map_err(RequestError::Malformed)?;

    if args.len() != signature.params().len() {
        return Err(RequestError::ArgumentCount {
            expected: signature.params().len(),
            got: args.len(),
        });
    }

    Ok(args)
}
