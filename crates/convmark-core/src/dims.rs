//! Tensor dimension triples.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The dimensions of a 3D tensor.
///
/// `Dims` describe both the shape flowing into a block and the shape a block
/// produces. Two values are equal iff all three components match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dims {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Dims {
    /// The all-zero shape, used as the inherited input of the root block.
    pub const ZERO: Dims = Dims::new(0, 0, 0);

    /// Create a new dimension triple.
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Returns `true` if any of the three axes is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }

    /// Total number of scalar components in a tensor of this shape.
    pub fn volume(&self) -> usize {
        self.width
            .saturating_mul(self.height)
            .saturating_mul(self.depth)
    }
}

impl From<(usize, usize, usize)> for Dims {
    fn from((width, height, depth): (usize, usize, usize)) -> Self {
        Self::new(width, height, depth)
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_equality() {
        assert_eq!(Dims::new(1, 2, 3), Dims::from((1, 2, 3)));
        assert_ne!(Dims::new(1, 2, 3), Dims::new(1, 2, 4));
        assert_ne!(Dims::new(1, 2, 3), Dims::new(2, 1, 3));
    }

    #[test]
    fn test_dims_is_empty() {
        assert!(Dims::ZERO.is_empty());
        assert!(Dims::new(4, 0, 3).is_empty());
        assert!(!Dims::new(1, 1, 1).is_empty());
    }

    #[test]
    fn test_dims_display() {
        assert_eq!(Dims::new(224, 112, 3).to_string(), "224x112x3");
    }

    #[test]
    fn test_dims_serde() {
        let dims = Dims::new(7, 7, 512);
        let json = serde_json::to_string(&dims).unwrap();
        assert_eq!(json, r#"{"width":7,"height":7,"depth":512}"#);

        let back: Dims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dims);
    }
}
