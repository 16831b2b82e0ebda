//! Validation errors for fractal specs and rule sets.

use std::fmt;

use super::FractalType;

/// A parameter set that cannot be turned into a valid [`FractalSpec`](super::FractalSpec).
#[derive(Debug, Clone, PartialEq)]
pub enum SpecError {
    /// Depth was negative.
    InvalidDepth(i64),
    /// A scalar parameter is out of its legal range.
    InvalidParam { field: &'static str, reason: String },
    /// A grammar rule is malformed.
    InvalidRule { symbol: String, reason: String },
    /// The fractal type name is not one of the recognized types.
    UnsupportedType(String),
    /// The parameter record does not belong to the fractal type.
    ParamsMismatch { kind: FractalType },
}

impl SpecError {
    pub fn param(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            field,
            reason: reason.into(),
        }
    }

    pub fn rule(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDepth(depth) => write!(f, "depth must be non-negative, got {depth}"),
            Self::InvalidParam { field, reason } => write!(f, "invalid `{field}`: {reason}"),
            Self::InvalidRule { symbol, reason } => write!(f, "invalid rule '{symbol}': {reason}"),
            Self::UnsupportedType(name) => write!(f, "unsupported fractal type '{name}'"),
            Self::ParamsMismatch { kind } => {
                write!(f, "parameters do not match fractal type '{kind}'")
            }
        }
    }
}

impl std::error::Error for SpecError {}
