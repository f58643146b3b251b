//! Lowering elaborated blocks into an external representation.
//!
//! A [`RealizerChain`] is an ordered list of [`Realizer`]s. Realizing a block
//! asks each realizer in turn and keeps the first answer that is not
//! [`Realization::Declined`]. Every realizer receives the chain itself, so
//! composite blocks (root, [`Residual`](convmark_core::block::Residual),
//! [`Repeat`](convmark_core::block::Repeat), ...) are lowered by recursing
//! through the whole chain rather than through one particular realizer.
//!
//! # Example
//!
//! ```
//! # use convmark::{Block, Dims, NetworkBuilder};
//! # use convmark::realize::{MetaRealizer, Realization, Realizer, RealizerChain, RealizeError};
//! struct Names;
//!
//! impl Realizer<String> for Names {
//!     fn realize(
//!         &self,
//!         chain: &RealizerChain<String>,
//!         input: Dims,
//!         block: &Block,
//!     ) -> Result<Realization<String>, RealizeError> {
//!         match block {
//!             Block::Root(root) => {
//!                 let names = chain.realize_all(input, root.children())?;
//!                 Ok(Realization::Value(names.join(" -> ")))
//!             }
//!             Block::Input(_) => Ok(Realization::Declined),
//!             other => Ok(Realization::Value(other.type_name().to_string())),
//!         }
//!     }
//! }
//!
//! let builder = NetworkBuilder::default();
//! let network = builder.parse("Input(w=8, h=8, d=1)\nConv(w=3, h=3, n=4)\nReLU").unwrap();
//!
//! let chain = RealizerChain::new().with(MetaRealizer).with(Names);
//! let text = chain.realize(Dims::ZERO, &network).unwrap();
//! assert_eq!(text.as_deref(), Some("Conv -> ReLU"));
//! ```

use std::error::Error;

use log::{debug, trace};
use thiserror::Error;

use convmark_core::{Block, Dims};
use convmark_parser::ErrorCode;

/// The outcome of asking one realizer about one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Realization<T> {
    /// The realizer does not handle this block; the chain moves on.
    Declined,
    /// The block was handled but has no runtime representation.
    Empty,
    /// The block was lowered to a value.
    Value(T),
}

/// A strategy for lowering blocks into values of type `T`.
///
/// A realizer that declines must not have side effects.
pub trait Realizer<T> {
    /// Attempt to lower `block`, which receives `input` from its predecessor.
    ///
    /// # Errors
    ///
    /// Return [`RealizeError::Failed`] when the block is handled but cannot
    /// be lowered. Errors from recursive calls to `chain` should be
    /// propagated unchanged.
    fn realize(
        &self,
        chain: &RealizerChain<T>,
        input: Dims,
        block: &Block,
    ) -> Result<Realization<T>, RealizeError>;
}

/// Errors produced while realizing a block tree.
#[derive(Debug, Error)]
pub enum RealizeError {
    /// Every realizer in the chain declined the block.
    #[error("unsupported block: {}", type_label(.block_type))]
    Unsupported { block_type: String },

    /// A realizer accepted the block but failed to lower it.
    #[error("failed to realize {}: {source}", type_label(.block_type))]
    Failed {
        block_type: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

fn type_label(block_type: &str) -> String {
    if block_type.is_empty() {
        "root block".to_string()
    } else {
        format!("`{block_type}`")
    }
}

impl RealizeError {
    /// Create a [`RealizeError::Failed`] for `block`.
    pub fn failed(block: &Block, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Failed {
            block_type: block.type_name().to_string(),
            source: source.into(),
        }
    }

    /// The type name of the block that could not be realized.
    pub fn block_type(&self) -> &str {
        match self {
            Self::Unsupported { block_type } | Self::Failed { block_type, .. } => block_type,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unsupported { .. } => ErrorCode::E400,
            Self::Failed { .. } => ErrorCode::E401,
        }
    }
}

/// An ordered list of realizers.
pub struct RealizerChain<T> {
    realizers: Vec<Box<dyn Realizer<T> + Send + Sync>>,
}

impl<T> RealizerChain<T> {
    /// An empty chain. It declines everything.
    pub fn new() -> Self {
        Self {
            realizers: Vec::new(),
        }
    }

    /// Append a realizer to the end of the chain.
    pub fn push(&mut self, realizer: impl Realizer<T> + Send + Sync + 'static) {
        self.realizers.push(Box::new(realizer));
    }

    /// Append a realizer, returning `self` for method chaining.
    pub fn with(mut self, realizer: impl Realizer<T> + Send + Sync + 'static) -> Self {
        self.push(realizer);
        self
    }

    pub fn len(&self) -> usize {
        self.realizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.realizers.is_empty()
    }

    /// Realize one block using the first realizer that does not decline.
    ///
    /// Returns `Ok(None)` when the block was handled without producing a
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`RealizeError::Unsupported`] if every realizer declined, or
    /// the error of the first realizer that failed.
    pub fn realize(&self, input: Dims, block: &Block) -> Result<Option<T>, RealizeError> {
        let block_type = block.type_name();
        for (index, realizer) in self.realizers.iter().enumerate() {
            trace!(realizer = index, block = block_type, input:% = input; "Trying realizer");
            match realizer.realize(self, input, block)? {
                Realization::Declined => continue,
                Realization::Empty => return Ok(None),
                Realization::Value(value) => return Ok(Some(value)),
            }
        }

        debug!(block = block_type, realizers = self.realizers.len(); "No realizer supports block");
        Err(RealizeError::Unsupported {
            block_type: block_type.to_string(),
        })
    }

    /// Realize a sequence of sibling blocks.
    ///
    /// The first block receives `input` and each later block receives the
    /// output of the one before it. Blocks realized without a value are
    /// skipped in the result.
    ///
    /// # Errors
    ///
    /// Stops at the first block that fails to realize.
    pub fn realize_all<'a, I>(&self, input: Dims, blocks: I) -> Result<Vec<T>, RealizeError>
    where
        I: IntoIterator<Item = &'a Block>,
    {
        let mut values = Vec::new();
        let mut dims = input;
        for block in blocks {
            if let Some(value) = self.realize(dims, block)? {
                values.push(value);
            }
            dims = block.out_dims();
        }
        Ok(values)
    }
}

impl<T> Default for RealizerChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Realizes the meta-blocks `Input` and `Assert` as no-ops and declines
/// everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaRealizer;

impl<T> Realizer<T> for MetaRealizer {
    fn realize(
        &self,
        _chain: &RealizerChain<T>,
        _input: Dims,
        block: &Block,
    ) -> Result<Realization<T>, RealizeError> {
        match block {
            Block::Input(_) | Block::Assert(_) => Ok(Realization::Empty),
            _ => Ok(Realization::Declined),
        }
    }
}
