//! Convmark Core Types
//!
//! This crate provides the foundational types shared by every stage of the
//! convmark pipeline:
//!
//! - **Dimensions**: the `(width, height, depth)` tensor shape ([`Dims`])
//! - **Blocks**: the elaborated, shape-typed block tree ([`block::Block`])
//! - **Names**: the built-in block names ([`names`] module)

pub mod block;
pub mod dims;
pub mod names;

pub use block::{Attributes, Block};
pub use dims::Dims;
