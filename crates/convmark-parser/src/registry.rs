//! The creator registry.
//!
//! A [`Registry`] maps block names to [`Creator`]s. It is plain,
//! caller-owned configuration: the engine only reads it, so one registry can
//! serve any number of elaborations, including concurrent ones.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use convmark_core::{Attributes, Block, Dims};

use crate::{builtin_blocks, error::BlockError};

/// Builds a [`Block`] from its inherited input dimensions, its attributes and
/// its already-elaborated children.
pub type Creator =
    Arc<dyn Fn(Dims, &Attributes, Vec<Block>) -> Result<Block, BlockError> + Send + Sync>;

/// A mapping from block names to creators.
///
/// The empty name is reserved for the root sequencing block.
///
/// # Example
///
/// ```
/// # use convmark_parser::{Registry, BlockError};
/// # use convmark_core::{Block, block::Custom};
/// let registry = Registry::builtin().with("Dropout", |input, attrs, children| {
///     if !children.is_empty() {
///         return Err(BlockError::UnexpectedChildren);
///     }
///     Ok(Block::Custom(Custom::new("Dropout", attrs.clone(), children, input)))
/// });
/// assert!(registry.contains("Dropout"));
/// assert!(registry.contains("Conv"));
/// ```
#[derive(Clone)]
pub struct Registry {
    creators: IndexMap<String, Creator>,
}

impl Registry {
    /// A registry with no creators at all, not even for the root.
    pub fn empty() -> Self {
        Self {
            creators: IndexMap::new(),
        }
    }

    /// The default table covering every built-in block.
    pub fn builtin() -> Self {
        builtin_blocks::defaults()
    }

    /// Register `creator` under `name`, returning the creator it replaced.
    pub fn insert<F>(&mut self, name: impl Into<String>, creator: F) -> Option<Creator>
    where
        F: Fn(Dims, &Attributes, Vec<Block>) -> Result<Block, BlockError> + Send + Sync + 'static,
    {
        self.creators.insert(name.into(), Arc::new(creator))
    }

    /// Register `creator` under `name`, replacing any existing entry.
    ///
    /// Returns `self` for method chaining.
    pub fn with<F>(mut self, name: impl Into<String>, creator: F) -> Self
    where
        F: Fn(Dims, &Attributes, Vec<Block>) -> Result<Block, BlockError> + Send + Sync + 'static,
    {
        self.insert(name, creator);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Creator> {
        self.creators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.creators.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.creators.keys().map(String::as_str)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use convmark_core::{block::Input, names};

    use super::*;

    #[test]
    fn test_builtin_covers_all_names() {
        let registry = Registry::builtin();
        for name in [
            names::ROOT,
            names::INPUT,
            names::ASSERT,
            names::CONV,
            names::MAX_POOL,
            names::MEAN_POOL,
            names::PADDING,
            names::RESIZE,
            names::FC,
            names::LINEAR,
            names::BATCH_NORM,
            names::RELU,
            names::SIGMOID,
            names::TANH,
            names::SOFTMAX,
            names::PROJECTION,
            names::RESIDUAL,
            names::REPEAT,
        ] {
            assert!(registry.contains(name), "missing creator for `{name}`");
        }
        assert!(!registry.contains("Dropout"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::empty();
        assert_eq!(registry.names().count(), 0);
        assert!(registry.get(names::ROOT).is_none());
    }

    #[test]
    fn test_insert_overrides() {
        let mut registry = Registry::builtin();
        let previous = registry.insert(names::INPUT, |_, _, _| {
            Ok(Block::Input(Input::new(Dims::new(1, 1, 1))))
        });
        assert!(previous.is_some());

        let creator = registry.get(names::INPUT).unwrap();
        let block = creator(Dims::ZERO, &Attributes::new(), Vec::new()).unwrap();
        assert_eq!(block.out_dims(), Dims::new(1, 1, 1));
    }
}
