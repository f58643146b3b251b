//! Errors raised while elaborating an AST into blocks.

use thiserror::Error;

use convmark_core::Dims;

use crate::error::ErrorCode;

/// An error reported by a creator (or by the engine on behalf of one).
///
/// `BlockError` does not know which block it belongs to; the engine wraps it
/// in an [`ElaborateError`] at the failing node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("unknown block type")]
    UnknownBlock,

    #[error("unexpected children")]
    UnexpectedChildren,

    #[error("not enough children")]
    NotEnoughChildren,

    #[error("unexpected attribute: {0}")]
    UnknownAttribute(String),

    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    #[error("attribute {0} must be integer")]
    NonIntegerAttribute(String),

    #[error("attribute {name} must be at least {min}")]
    AttributeBelowMinimum { name: String, min: usize },

    #[error("shape mismatch: expected {expected} but got {actual}")]
    ShapeMismatch { expected: Dims, actual: Dims },

    #[error("input {0} has an empty dimension")]
    EmptyInput(Dims),

    #[error("{0}")]
    Other(String),
}

impl BlockError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BlockError::UnknownBlock => ErrorCode::E300,
            BlockError::UnexpectedChildren => ErrorCode::E301,
            BlockError::NotEnoughChildren => ErrorCode::E302,
            BlockError::UnknownAttribute(_) => ErrorCode::E303,
            BlockError::MissingAttribute(_) => ErrorCode::E304,
            BlockError::NonIntegerAttribute(_) => ErrorCode::E305,
            BlockError::AttributeBelowMinimum { .. } => ErrorCode::E306,
            BlockError::ShapeMismatch { .. } | BlockError::EmptyInput(_) => ErrorCode::E307,
            BlockError::Other(_) => ErrorCode::E308,
        }
    }

    /// The attribute this error is about, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            BlockError::UnknownAttribute(name)
            | BlockError::MissingAttribute(name)
            | BlockError::NonIntegerAttribute(name)
            | BlockError::AttributeBelowMinimum { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A semantic error identifying the block that failed to elaborate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}: {source}", line_prefix(.line), block_label(.block))]
pub struct ElaborateError {
    block: String,
    line: Option<usize>,
    #[source]
    source: BlockError,
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|line| format!("line {}: ", line + 1))
        .unwrap_or_default()
}

fn block_label(block: &str) -> String {
    if block.is_empty() {
        "root block".to_string()
    } else {
        format!("block `{block}`")
    }
}

impl ElaborateError {
    /// Create an elaboration error.
    ///
    /// # Arguments
    /// * `block` - Name of the failing block (empty for the root)
    /// * `line` - 0-based source line of the block, if it has one
    /// * `source` - What went wrong
    pub fn new(block: impl Into<String>, line: Option<usize>, source: BlockError) -> Self {
        Self {
            block: block.into(),
            line,
            source,
        }
    }

    pub fn block(&self) -> &str {
        &self.block
    }

    /// The 0-based line of the failing block. `None` for the root.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn kind(&self) -> &BlockError {
        &self.source
    }

    pub fn code(&self) -> ErrorCode {
        self.source.code()
    }
}
