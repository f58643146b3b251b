//! # Convmark Parser
//!
//! Front end for the convmark network description language. This crate turns
//! markup text into a tree of shape-typed blocks in two phases:
//!
//! 1. **Parse** - [`parse`] reads source lines into an [`AstNode`] tree
//! 2. **Elaborate** - [`elaborate`] looks up a creator for every node in a
//!    [`Registry`], threads tensor dimensions through siblings and checks
//!    every block's attributes and shapes
//!
//! ## Usage
//!
//! ```
//! # use convmark_parser::{parse, elaborate, ElaborateConfig, ElaborateError};
//! # use convmark_core::Dims;
//! let source = "
//! Input(w=224, h=224, d=3)
//! Conv(w=7, h=7, n=64, sx=2, sy=2)
//! ReLU
//! MaxPool(w=2, h=2)
//! ";
//!
//! let root = parse(source).unwrap();
//! let network = elaborate(&root, &ElaborateConfig::default()).unwrap();
//! assert_eq!(network.out_dims(), Dims::new(54, 54, 64));
//! ```

mod ast;
mod attributes;
mod builtin_blocks;
mod elaborate;
pub mod error;
mod parser;
mod registry;

pub use ast::AstNode;
pub use attributes::{AttributeSchema, ValidAttributes, expect_children, expect_no_children};
pub use elaborate::{ElaborateConfig, elaborate};
pub use error::{BlockError, ElaborateError, ErrorCode, ParseError};
pub use parser::parse;
pub use registry::{Creator, Registry};
