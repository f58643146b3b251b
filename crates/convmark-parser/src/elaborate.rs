//! Elaboration phase for the convmark AST
//!
//! This module turns a parsed [`AstNode`] tree into a tree of shape-typed
//! [`Block`]s. Children are elaborated in order, each receiving the output
//! dimensions of the sibling before it (the first child receives its parent's
//! input). Once a node's children are done, the creator registered under the
//! node's name validates the node and builds its block.

use log::{debug, info, trace};

use convmark_core::{Block, Dims};

use crate::{
    ast::AstNode,
    error::{BlockError, ElaborateError},
    registry::Registry,
};

/// Configuration for the elaboration phase.
///
/// Holds the dimensions handed to the root and the registry used to look up
/// creators. The default starts from zero dimensions with the built-in
/// registry.
#[derive(Debug, Clone, Default)]
pub struct ElaborateConfig {
    input: Dims,
    registry: Registry,
}

impl ElaborateConfig {
    /// Create a new ElaborateConfig with the given root input and registry
    pub fn new(input: Dims, registry: Registry) -> Self {
        Self { input, registry }
    }

    /// Set the dimensions handed to the root.
    pub fn with_input(mut self, input: Dims) -> Self {
        self.input = input;
        self
    }

    /// Replace the creator registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn input(&self) -> Dims {
        self.input
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

struct Elaborator<'r> {
    registry: &'r Registry,
}

impl<'r> Elaborator<'r> {
    fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    fn elaborate(&self, node: &AstNode, input: Dims) -> Result<Block, ElaborateError> {
        let name = node.name();
        trace!(block = name, line:? = node.line(), input:% = input; "Elaborating block");

        let mut children = Vec::with_capacity(node.children().len());
        let mut dims = input;
        for child in node.children() {
            let block = self.elaborate(child, dims)?;
            dims = block.out_dims();
            children.push(block);
        }

        // Children fail first, so an unknown parent never hides their errors.
        let creator = self
            .registry
            .get(name)
            .ok_or_else(|| ElaborateError::new(name, node.line(), BlockError::UnknownBlock))?;
        let block = creator(input, node.attrs(), children)
            .map_err(|err| ElaborateError::new(name, node.line(), err))?;

        debug!(block = name, out:% = block.out_dims(); "Elaborated block");
        Ok(block)
    }
}

/// Elaborate a parsed tree into a block tree.
///
/// The node is usually the root returned by [`parse`](crate::parse); it
/// receives `config.input()` as its inherited dimensions.
///
/// # Errors
///
/// Returns an [`ElaborateError`] naming the first block that failed. No
/// partial tree is returned.
///
/// # Example
///
/// ```
/// # use convmark_parser::{parse, elaborate, ElaborateConfig};
/// # use convmark_core::Dims;
/// let root = parse("Input(w=32, h=32, d=3)\nConv(w=3, h=3, n=16)").unwrap();
/// let block = elaborate(&root, &ElaborateConfig::default()).unwrap();
/// assert_eq!(block.out_dims(), Dims::new(30, 30, 16));
/// ```
pub fn elaborate(node: &AstNode, config: &ElaborateConfig) -> Result<Block, ElaborateError> {
    debug!(input:% = config.input(); "Elaborating tree");
    let block = Elaborator::new(config.registry()).elaborate(node, config.input())?;
    info!(
        blocks = block.node_count(),
        out:% = block.out_dims();
        "Elaboration completed successfully"
    );
    Ok(block)
}
