//! Built-in block names.
//!
//! These are the names a source file uses to refer to the built-in blocks,
//! and the values returned by [`Block::type_name`](crate::Block::type_name).

/// Name of the implicit top-level sequencing block.
pub const ROOT: &str = "";

/// Declares the input tensor dimensions
pub const INPUT: &str = "Input";

/// Checks the inherited dimensions without changing them
pub const ASSERT: &str = "Assert";

/// Convolutional layer
pub const CONV: &str = "Conv";

/// Max-pooling layer
pub const MAX_POOL: &str = "MaxPool";

/// Mean-pooling layer
pub const MEAN_POOL: &str = "MeanPool";

/// Zero padding around the spatial axes
pub const PADDING: &str = "Padding";

/// Spatial interpolation to a fixed width and height
pub const RESIZE: &str = "Resize";

/// Fully-connected layer
pub const FC: &str = "FC";

/// Component-wise `scale * x + bias`
pub const LINEAR: &str = "Linear";

/// Batch normalization
pub const BATCH_NORM: &str = "BatchNorm";

/// ReLU activation
pub const RELU: &str = "ReLU";

/// Sigmoid activation
pub const SIGMOID: &str = "Sigmoid";

/// Tanh activation
pub const TANH: &str = "Tanh";

/// Softmax activation
pub const SOFTMAX: &str = "Softmax";

/// Alternate branch of a residual grouping
pub const PROJECTION: &str = "Projection";

/// Residual grouping
pub const RESIDUAL: &str = "Residual";

/// Repeats its body a number of times
pub const REPEAT: &str = "Repeat";
