//! Convmark - a markup language for describing convolutional neural networks.
//!
//! Parsing, shape elaboration and realization for convmark sources. A source
//! file lists blocks one per line, nesting bodies in braces:
//!
//! ```text
//! Input(w=32, h=32, d=3)
//! Residual {
//!     Conv(w=1, h=1, n=3)
//! }
//! FC(out=10)
//! ```
//!
//! [`NetworkBuilder`] parses and elaborates a source into a [`Block`] tree
//! whose every node knows its output [`Dims`]. A [`RealizerChain`] can then
//! lower that tree into any external representation.

mod error;
pub mod realize;

pub use convmark_core::{Attributes, Block, Dims, block, names};
pub use convmark_parser::{
    AstNode, AttributeSchema, BlockError, Creator, ElaborateConfig, ElaborateError, ErrorCode,
    ParseError, Registry, ValidAttributes, expect_children, expect_no_children,
};

pub use error::ConvmarkError;
pub use realize::{MetaRealizer, RealizeError, Realization, Realizer, RealizerChain};

use log::{debug, info, trace};

/// Builder for parsing, elaborating and realizing convmark networks.
///
/// # Examples
///
/// ```rust
/// use convmark::{Dims, ElaborateConfig, NetworkBuilder, Registry};
///
/// let source = "Input(w=28, h=28, d=1)\nConv(w=5, h=5, n=6)\nMaxPool(w=2, h=2)";
///
/// // With custom config
/// let config = ElaborateConfig::default().with_registry(Registry::builtin());
/// let builder = NetworkBuilder::new(config);
///
/// let network = builder.parse(source).expect("Failed to parse");
/// assert_eq!(network.out_dims(), Dims::new(12, 12, 6));
///
/// // Or use default config
/// let builder = NetworkBuilder::default();
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    config: ElaborateConfig,
}

impl NetworkBuilder {
    /// Create a new network builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Root input dimensions and the creator registry
    pub fn new(config: ElaborateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ElaborateConfig {
        &self.config
    }

    /// Parse source text into its syntax tree without elaborating it.
    ///
    /// # Errors
    ///
    /// Returns `ConvmarkError::Parse` for the first malformed line.
    pub fn parse_ast(&self, source: &str) -> Result<AstNode, ConvmarkError> {
        let ast = convmark_parser::parse(source)?;
        trace!(nodes = ast.node_count(); "Parsed syntax tree");
        Ok(ast)
    }

    /// Parse and elaborate source text into a block tree.
    ///
    /// # Errors
    ///
    /// Returns `ConvmarkError::Parse` for syntax errors and
    /// `ConvmarkError::Elaborate` for attribute, structure and shape errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use convmark::{ConvmarkError, NetworkBuilder};
    ///
    /// let builder = NetworkBuilder::default();
    /// let err = builder.parse("Input(w=8, h=8, d=1)\nConv(w=3, n=4)").unwrap_err();
    /// assert!(matches!(err, ConvmarkError::Elaborate(_)));
    /// assert_eq!(err.to_string(), "line 2: block `Conv`: missing attribute: h");
    /// ```
    pub fn parse(&self, source: &str) -> Result<Block, ConvmarkError> {
        info!("Parsing network");

        let ast = self.parse_ast(source)?;
        let network = convmark_parser::elaborate(&ast, &self.config)?;

        debug!(out:% = network.out_dims(); "Network parsed successfully");
        Ok(network)
    }

    /// Lower an elaborated network through `chain`.
    ///
    /// The network receives the configured root input, as it did during
    /// elaboration.
    ///
    /// # Errors
    ///
    /// Returns `ConvmarkError::Realize` if some block is unsupported by every
    /// realizer or a realizer fails.
    pub fn realize<T>(
        &self,
        chain: &RealizerChain<T>,
        network: &Block,
    ) -> Result<Option<T>, ConvmarkError> {
        info!(realizers = chain.len(); "Realizing network");
        let value = chain.realize(self.config.input(), network)?;
        Ok(value)
    }
}
