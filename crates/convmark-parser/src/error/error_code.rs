//! Error codes for the convmark diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Parser errors
//! - `E3xx` - Elaboration errors
//! - `E4xx` - Realization errors

use std::fmt;

/// Error codes for categorizing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Invalid block declaration.
    ///
    /// A line is neither a comment, a closing `}`, nor a block header of the
    /// form `Name`, `Name(attrs)`, optionally followed by ` {`.
    E100,

    /// Malformed attribute.
    ///
    /// An entry of an attribute list is not of the form `name=value`, or its
    /// value is not a decimal number.
    E101,

    /// Duplicate attribute.
    ///
    /// The same attribute name appears twice in one attribute list.
    E102,

    /// Unclosed block.
    ///
    /// A block body opened with `{` has no matching `}` line.
    E103,

    // =========================================================================
    // Elaboration Errors (E3xx)
    // =========================================================================
    /// Unknown block.
    ///
    /// No creator is registered under the block's name.
    E300,

    /// Unexpected children.
    ///
    /// The block has children but does not accept any, or accepts fewer.
    E301,

    /// Not enough children.
    ///
    /// The block requires a body (or a larger one) than was given.
    E302,

    /// Unknown attribute.
    E303,

    /// Missing required attribute.
    E304,

    /// Non-integer attribute.
    ///
    /// An integer-typed attribute has a fractional part.
    E305,

    /// Attribute below minimum.
    E306,

    /// Shape mismatch.
    ///
    /// The dimensions flowing into or out of a block violate the block's
    /// shape rule (for example an `Assert` that does not hold, or a
    /// `Residual` branch that changes the shape).
    E307,

    /// Creator-specific failure.
    ///
    /// Reported by caller-registered creators.
    E308,

    // =========================================================================
    // Realization Errors (E4xx)
    // =========================================================================
    /// Unsupported block.
    ///
    /// Every realizer in the chain declined the block.
    E400,

    /// Realization failed.
    ///
    /// A realizer accepted the block but could not lower it.
    E401,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Elaboration errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
            ErrorCode::E306 => "E306",
            ErrorCode::E307 => "E307",
            ErrorCode::E308 => "E308",
            // Realization errors
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Parser errors
            ErrorCode::E100 => "invalid block declaration",
            ErrorCode::E101 => "malformed attribute",
            ErrorCode::E102 => "duplicate attribute",
            ErrorCode::E103 => "unclosed block",
            // Elaboration errors
            ErrorCode::E300 => "unknown block",
            ErrorCode::E301 => "unexpected children",
            ErrorCode::E302 => "not enough children",
            ErrorCode::E303 => "unknown attribute",
            ErrorCode::E304 => "missing attribute",
            ErrorCode::E305 => "non-integer attribute",
            ErrorCode::E306 => "attribute below minimum",
            ErrorCode::E307 => "shape mismatch",
            ErrorCode::E308 => "block creation failed",
            // Realization errors
            ErrorCode::E400 => "unsupported block",
            ErrorCode::E401 => "realization failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E307.to_string(), "E307");
        assert_eq!(ErrorCode::E400.to_string(), "E400");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E103.description(), "unclosed block");
        assert_eq!(ErrorCode::E300.description(), "unknown block");
        assert_eq!(ErrorCode::E307.description(), "shape mismatch");
    }
}
