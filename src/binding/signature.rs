//! Signature descriptors
//!
//! A [`Signature`] is computed once per bound function and only read
//! afterwards, so it can be shared across concurrent requests.

use crate::error::BindError;
use crate::value::{TypeDef, ValueType};

/// How many values a bound function returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnArity {
    /// Only an error.
    One,
    /// A payload followed by an error.
    Two,
}

/// The precomputed shape of a bound function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ValueType>,
    payload: Option<ValueType>,
    wants_context: bool,
    returns: ReturnArity,
}

impl Signature {
    /// Validate a type definition and build its descriptor.
    pub fn bind(def: &TypeDef) -> Result<Self, BindError> {
        let function = match def {
            TypeDef::Function(function) => function,
            TypeDef::Value(_) => return Err(BindError::NotAFunction),
        };

        let returns = match function.results.len() {
            1 => ReturnArity::One,
            2 => ReturnArity::Two,
            n => return Err(BindError::ReturnArity(n)),
        };

        if function.results.last() != Some(&ValueType::Error) {
            return Err(BindError::ErrorReturn);
        }

        let wants_context = function.params.first() == Some(&ValueType::Context);
        let offset = usize::from(wants_context);
        let params: Vec<ValueType> = function.params[offset..].to_vec();

        if let Some((i, ty)) = params
            .iter()
            .enumerate()
            .find(|(_, ty)| !ty.is_decodable())
        {
            return Err(BindError::MisplacedType {
                position: i + offset + 1,
                kind: ty.kind_name(),
            });
        }

        let payload = match returns {
            ReturnArity::Two => Some(function.results[0].clone()),
            ReturnArity::One => None,
        };

        Ok(Self {
            params,
            payload,
            wants_context,
            returns,
        })
    }

    /// Parameter types the caller supplies, in order. Excludes the context.
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn wants_context(&self) -> bool {
        self.wants_context
    }

    pub fn returns(&self) -> ReturnArity {
        self.returns
    }

    /// Static type of the payload slot, for two-value functions.
    pub fn payload(&self) -> Option<&ValueType> {
        self.payload.as_ref()
    }
}
