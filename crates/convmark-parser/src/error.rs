//! Error types for the convmark parser and elaboration engine.
//!
//! There are two error families:
//! - [`ParseError`] - grammar-level failures, identified by a source line
//! - [`ElaborateError`] - semantic failures, identified by the offending
//!   block and wrapping the [`BlockError`] its creator reported
//!
//! Every error maps to a stable [`ErrorCode`] for documentation and
//! searchability.
//!
//! # Example
//!
//! ```
//! # use convmark_parser::error::{ErrorCode, ParseError};
//!
//! let err = ParseError::new(ErrorCode::E102, 3, "duplicate attribute: w")
//!     .with_help("remove one of the `w` attributes");
//! assert_eq!(err.to_string(), "line 4: duplicate attribute: w");
//! ```

mod elaborate_error;
mod error_code;
mod parse_error;

pub use elaborate_error::{BlockError, ElaborateError};
pub use error_code::ErrorCode;
pub use parse_error::ParseError;
