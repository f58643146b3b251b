//! The ParseError type for grammar-level failures.

use thiserror::Error;

use crate::error::ErrorCode;

/// An error produced while parsing source text.
///
/// Parsing stops at the first malformed line, so a `ParseError` always
/// describes exactly one problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {}: {message}", .line + 1)]
pub struct ParseError {
    code: ErrorCode,

    /// 0-based source line
    line: usize,

    message: String,

    help: Option<String>,
}

impl ParseError {
    /// Create a parse error.
    ///
    /// # Arguments
    /// * `code` - The error code
    /// * `line` - The 0-based source line
    /// * `message` - The main error message
    pub fn new(code: ErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            line,
            message: message.into(),
            help: None,
        }
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The 0-based line the error was found on.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_is_one_based() {
        let err = ParseError::new(ErrorCode::E100, 0, "invalid block declaration");
        assert_eq!(err.to_string(), "line 1: invalid block declaration");
        assert_eq!(err.line(), 0);
    }

    #[test]
    fn test_parse_error_with_help() {
        let err = ParseError::new(ErrorCode::E103, 5, "no matching }")
            .with_help("close the block with a `}` on its own line");

        assert_eq!(err.code(), ErrorCode::E103);
        assert_eq!(
            err.help(),
            Some("close the block with a `}` on its own line")
        );
    }
}
