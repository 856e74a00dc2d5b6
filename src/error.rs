//! Error types for binding and serving functions.

use thiserror::Error;

use crate::value::ConversionError;

/// A function's shape can't be bound. Raised once, before any request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("fn wasn't a function")]
    NotAFunction,

    #[error("fn doesn't return 1 or 2 values")]
    ReturnArity(usize),

    #[error("fn doesn't return a error as last value")]
    ErrorReturn,

    /// A `Context` after the first position, or an `Error` among the
    /// parameters.
    #[error("parameter {position} has type {kind}, which can't be decoded from arguments")]
    MisplacedType { position: usize, kind: &'static str },
}

/// One argument couldn't be matched to its parameter type.
///
/// Indices are 1-based, as the caller counts them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("{index}. can't be null")]
    Null { index: usize },

    #[error("mismatching argument type of {index}. argument. got={got} expected={expected}")]
    Mismatch {
        index: usize,
        got: &'static str,
        expected: &'static str,
    },

    /// Mismatch inside a record, list or map argument.
    #[error("mismatching argument type of {index}. argument at '{path}'. got={got} expected={expected}")]
    Nested {
        index: usize,
        path: String,
        got: &'static str,
        expected: &'static str,
    },
}

impl CoercionError {
    pub fn index(&self) -> usize {
        match self {
            CoercionError::Null { index }
            | CoercionError::Mismatch { index, .. }
            | CoercionError::Nested { index, .. } => *index,
        }
    }
}

/// A request failed. Every variant is answered with status 400 and its
/// message.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("only POST requests are permitted")]
    MethodNotAllowed,

    #[error("request body could not be read")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("malformed arguments")]
    Malformed(#[source] serde_json::Error),

    #[error("number of arguments mismatch")]
    ArgumentCount { expected: usize, got: usize },

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("argument {index} could not be converted: {source}")]
    Conversion {
        index: usize,
        #[source]
        source: ConversionError,
    },

    #[error("failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bound function returned an error.
    #[error("{0}")]
    Failed(String),
}
