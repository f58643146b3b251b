//! Error types for convmark operations.
//!
//! This module provides the main error type [`ConvmarkError`] which wraps
//! the failures of every stage: parsing, elaboration and realization.

use thiserror::Error;

use convmark_parser::{ElaborateError, ErrorCode, ParseError};

use crate::realize::RealizeError;

/// The main error type for convmark operations.
#[derive(Debug, Error)]
pub enum ConvmarkError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Elaborate(#[from] ElaborateError),

    #[error(transparent)]
    Realize(#[from] RealizeError),
}

impl ConvmarkError {
    /// The stable code of the wrapped error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(err) => err.code(),
            Self::Elaborate(err) => err.code(),
            Self::Realize(err) => err.code(),
        }
    }

    /// The 0-based source line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse(err) => Some(err.line()),
            Self::Elaborate(err) => err.line(),
            Self::Realize(_) => None,
        }
    }
}
