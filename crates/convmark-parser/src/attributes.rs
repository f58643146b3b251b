//! Attribute validation shared by the block creators.
//!
//! Every block type declares an [`AttributeSchema`]. Validation is uniform:
//!
//! 1. reject any attribute the schema does not declare,
//! 2. require every attribute marked required,
//! 3. check that integer attributes have no fractional part and are not
//!    below their minimum.
//!
//! The schema is public so that caller-registered creators can validate
//! their attributes the same way the built-in ones do.

use convmark_core::Attributes;

use crate::error::BlockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeKind {
    Integer { min: usize },
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttributeSpec {
    name: &'static str,
    kind: AttributeKind,
    required: bool,
}

/// The attributes a block type accepts.
///
/// # Example
///
/// ```
/// # use convmark_parser::AttributeSchema;
/// # use convmark_core::Attributes;
/// let schema = AttributeSchema::new()
///     .required_int("w", 1)
///     .optional_int("sx", 1);
///
/// let attrs: Attributes = [("w".to_string(), 3.0)].into_iter().collect();
/// let valid = schema.validate(&attrs).unwrap();
/// assert_eq!(valid.int_or("sx", 1), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttributeSchema {
    specs: Vec<AttributeSpec>,
}

impl AttributeSchema {
    /// A schema that accepts no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required integer attribute with a minimum value.
    pub fn required_int(self, name: &'static str, min: usize) -> Self {
        self.with_spec(name, AttributeKind::Integer { min }, true)
    }

    /// Declare an optional integer attribute with a minimum value.
    pub fn optional_int(self, name: &'static str, min: usize) -> Self {
        self.with_spec(name, AttributeKind::Integer { min }, false)
    }

    /// Declare an optional real-valued attribute.
    pub fn optional_real(self, name: &'static str) -> Self {
        self.with_spec(name, AttributeKind::Real, false)
    }

    fn with_spec(mut self, name: &'static str, kind: AttributeKind, required: bool) -> Self {
        self.specs.push(AttributeSpec {
            name,
            kind,
            required,
        });
        self
    }

    fn spec(&self, name: &str) -> Option<&AttributeSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Check `attrs` against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in the order unknown attribute,
    /// missing attribute, non-integer value, value below minimum.
    pub fn validate<'a>(&self, attrs: &'a Attributes) -> Result<ValidAttributes<'a>, BlockError> {
        if let Some(name) = attrs.keys().find(|name| self.spec(name).is_none()) {
            return Err(BlockError::UnknownAttribute(name.clone()));
        }

        if let Some(spec) = self
            .specs
            .iter()
            .find(|spec| spec.required && !attrs.contains_key(spec.name))
        {
            return Err(BlockError::MissingAttribute(spec.name.to_string()));
        }

        for spec in &self.specs {
            let (Some(value), AttributeKind::Integer { min }) = (attrs.get(spec.name), spec.kind)
            else {
                continue;
            };
            if value.fract() != 0.0 {
                return Err(BlockError::NonIntegerAttribute(spec.name.to_string()));
            }
            if *value < min as f64 {
                return Err(BlockError::AttributeBelowMinimum {
                    name: spec.name.to_string(),
                    min,
                });
            }
        }

        Ok(ValidAttributes(attrs))
    }
}

/// Attributes that passed [`AttributeSchema::validate`].
#[derive(Debug, Clone, Copy)]
pub struct ValidAttributes<'a>(&'a Attributes);

impl ValidAttributes<'_> {
    /// An integer attribute, if present. Values past `usize::MAX` saturate.
    pub fn int(&self, name: &str) -> Option<usize> {
        self.0.get(name).map(|value| *value as usize)
    }

    /// An integer attribute, or `default` when absent.
    pub fn int_or(&self, name: &str, default: usize) -> usize {
        self.int(name).unwrap_or(default)
    }

    /// A real attribute, or `default` when absent.
    pub fn real_or(&self, name: &str, default: f64) -> f64 {
        self.0.get(name).copied().unwrap_or(default)
    }
}

/// Fail unless a leaf block was given no children.
pub fn expect_no_children<T>(children: &[T]) -> Result<(), BlockError> {
    if children.is_empty() {
        Ok(())
    } else {
        Err(BlockError::UnexpectedChildren)
    }
}

/// Fail unless a container block was given at least one child.
pub fn expect_children<T>(children: &[T]) -> Result<(), BlockError> {
    if children.is_empty() {
        Err(BlockError::NotEnoughChildren)
    } else {
        Ok(())
    }
}
