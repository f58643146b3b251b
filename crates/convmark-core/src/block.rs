//! Elaborated block types.
//!
//! A [`Block`] is the shape-typed counterpart of a parsed source node. The
//! family is closed: every consumer matches on [`Block`] exhaustively, and
//! blocks contributed by custom creators are carried by [`Block::Custom`].
//!
//! Blocks are immutable once constructed. The constructors in this module
//! own the shape-transfer arithmetic; attribute and structural validation is
//! the job of the creators that call them.

use indexmap::IndexMap;

use crate::{dims::Dims, names};

/// Numeric attributes of a block, in source order.
pub type Attributes = IndexMap<String, f64>;

/// An elaborated block with a known output shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Root(Root),
    Input(Input),
    Assert(Assert),
    Conv(Conv),
    Pool(Pool),
    Padding(Padding),
    Resize(Resize),
    FullyConnected(FullyConnected),
    Linear(Linear),
    Activation(Activation),
    Projection(Projection),
    Residual(Residual),
    Repeat(Repeat),
    Custom(Custom),
}

impl Block {
    /// The block's source name. Empty for the root.
    pub fn type_name(&self) -> &str {
        match self {
            Block::Root(_) => names::ROOT,
            Block::Input(_) => names::INPUT,
            Block::Assert(_) => names::ASSERT,
            Block::Conv(_) => names::CONV,
            Block::Pool(pool) => pool.kind().name(),
            Block::Padding(_) => names::PADDING,
            Block::Resize(_) => names::RESIZE,
            Block::FullyConnected(_) => names::FC,
            Block::Linear(_) => names::LINEAR,
            Block::Activation(activation) => activation.kind().name(),
            Block::Projection(_) => names::PROJECTION,
            Block::Residual(_) => names::RESIDUAL,
            Block::Repeat(_) => names::REPEAT,
            Block::Custom(custom) => custom.name(),
        }
    }

    /// The dimensions of the tensor this block produces.
    pub fn out_dims(&self) -> Dims {
        match self {
            Block::Root(root) => root.out,
            Block::Input(input) => input.out,
            Block::Assert(assert) => assert.dims,
            Block::Conv(conv) => conv.out,
            Block::Pool(pool) => pool.out,
            Block::Padding(padding) => padding.out,
            Block::Resize(resize) => resize.out,
            Block::FullyConnected(fc) => fc.out,
            Block::Linear(linear) => linear.out,
            Block::Activation(activation) => activation.out,
            Block::Projection(projection) => projection.input,
            Block::Residual(residual) => residual.out,
            Block::Repeat(repeat) => repeat.input,
            Block::Custom(custom) => custom.out,
        }
    }

    /// Sub-blocks in source order.
    ///
    /// For a [`Residual`], the projection branch (if any) comes first,
    /// followed by the residual branch.
    pub fn children(&self) -> Vec<&Block> {
        match self {
            Block::Root(root) => root.children.iter().collect(),
            Block::Projection(projection) => projection.children.iter().collect(),
            Block::Residual(residual) => residual
                .projection
                .iter()
                .flatten()
                .chain(residual.residual.iter())
                .collect(),
            Block::Repeat(repeat) => repeat.children.iter().collect(),
            Block::Custom(custom) => custom.children.iter().collect(),
            Block::Input(_)
            | Block::Assert(_)
            | Block::Conv(_)
            | Block::Pool(_)
            | Block::Padding(_)
            | Block::Resize(_)
            | Block::FullyConnected(_)
            | Block::Linear(_)
            | Block::Activation(_) => Vec::new(),
        }
    }

    /// Number of blocks in this tree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Block::node_count)
            .sum::<usize>()
    }
}

/// Output size along one axis of a sliding window.
///
/// Computes `max(0, 1 + floor((input - window) / stride))` in 128-bit signed
/// arithmetic, so every `usize` operand is exact. A zero stride is treated as
/// one.
pub fn window_output(input: usize, window: usize, stride: usize) -> usize {
    let span = input as i128 - window as i128;
    let out = 1 + span.div_euclid(stride.max(1) as i128);
    usize::try_from(out.max(0)).unwrap_or(usize::MAX)
}

/// The implicit top-level sequencing block.
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    children: Vec<Block>,
    out: Dims,
}

impl Root {
    /// Create a root over already-threaded children.
    ///
    /// The output is the last child's output, or `input` when there are no
    /// children.
    pub fn new(input: Dims, children: Vec<Block>) -> Self {
        let out = children.last().map_or(input, Block::out_dims);
        Self { children, out }
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }
}

/// Declares the input tensor dimensions, ignoring whatever is inherited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    out: Dims,
}

impl Input {
    pub fn new(out: Dims) -> Self {
        Self { out }
    }
}

/// Passes its input through after checking it against fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assert {
    dims: Dims,
}

impl Assert {
    pub fn new(dims: Dims) -> Self {
        Self { dims }
    }

    /// The asserted (and therefore produced) dimensions.
    pub fn dims(&self) -> Dims {
        self.dims
    }
}

/// A convolutional layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conv {
    filter_width: usize,
    filter_height: usize,
    filter_count: usize,
    stride_x: usize,
    stride_y: usize,
    out: Dims,
}

impl Conv {
    /// Create a convolution over `input`.
    ///
    /// The output depth is the filter count; width and height follow
    /// [`window_output`].
    pub fn new(
        input: Dims,
        filter_width: usize,
        filter_height: usize,
        filter_count: usize,
        stride_x: usize,
        stride_y: usize,
    ) -> Self {
        let out = Dims::new(
            window_output(input.width, filter_width, stride_x),
            window_output(input.height, filter_height, stride_y),
            filter_count,
        );
        Self {
            filter_width,
            filter_height,
            filter_count,
            stride_x,
            stride_y,
            out,
        }
    }

    pub fn filter_width(&self) -> usize {
        self.filter_width
    }

    pub fn filter_height(&self) -> usize {
        self.filter_height
    }

    pub fn filter_count(&self) -> usize {
        self.filter_count
    }

    pub fn stride_x(&self) -> usize {
        self.stride_x
    }

    pub fn stride_y(&self) -> usize {
        self.stride_y
    }
}

/// The reduction applied by a pooling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Max,
    Mean,
}

impl PoolKind {
    /// The source name of a pooling block of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            PoolKind::Max => names::MAX_POOL,
            PoolKind::Mean => names::MEAN_POOL,
        }
    }
}

/// A max- or mean-pooling layer. Partial pools are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    kind: PoolKind,
    width: usize,
    height: usize,
    stride_x: usize,
    stride_y: usize,
    out: Dims,
}

impl Pool {
    pub fn new(
        kind: PoolKind,
        input: Dims,
        width: usize,
        height: usize,
        stride_x: usize,
        stride_y: usize,
    ) -> Self {
        let out = Dims::new(
            window_output(input.width, width, stride_x),
            window_output(input.height, height, stride_y),
            input.depth,
        );
        Self {
            kind,
            width,
            height,
            stride_x,
            stride_y,
            out,
        }
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride_x(&self) -> usize {
        self.stride_x
    }

    pub fn stride_y(&self) -> usize {
        self.stride_y
    }
}

/// Zero padding around the spatial axes of a tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Padding {
    top: usize,
    right: usize,
    bottom: usize,
    left: usize,
    out: Dims,
}

impl Padding {
    /// Pad `input`. Axes that would exceed `usize::MAX` saturate.
    pub fn new(input: Dims, top: usize, right: usize, bottom: usize, left: usize) -> Self {
        let out = Dims::new(
            input.width.saturating_add(left).saturating_add(right),
            input.height.saturating_add(top).saturating_add(bottom),
            input.depth,
        );
        Self {
            top,
            right,
            bottom,
            left,
            out,
        }
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn right(&self) -> usize {
        self.right
    }

    pub fn bottom(&self) -> usize {
        self.bottom
    }

    pub fn left(&self) -> usize {
        self.left
    }
}

/// Interpolates the spatial axes to a fixed size, keeping the depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resize {
    out: Dims,
}

impl Resize {
    pub fn new(input: Dims, width: usize, height: usize) -> Self {
        Self {
            out: Dims::new(width, height, input.depth),
        }
    }
}

/// A fully-connected layer producing a `1x1xN` tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullyConnected {
    out: Dims,
}

impl FullyConnected {
    pub fn new(out_count: usize) -> Self {
        Self {
            out: Dims::new(1, 1, out_count),
        }
    }

    pub fn out_count(&self) -> usize {
        self.out.depth
    }
}

/// Scales every component by `scale` and then adds `bias`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    scale: f64,
    bias: f64,
    out: Dims,
}

impl Linear {
    pub fn new(input: Dims, scale: f64, bias: f64) -> Self {
        Self {
            scale,
            bias,
            out: input,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

/// The function applied by an [`Activation`] block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationKind {
    BatchNorm,
    ReLU,
    Sigmoid,
    Tanh,
    Softmax,
}

impl ActivationKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActivationKind::BatchNorm => names::BATCH_NORM,
            ActivationKind::ReLU => names::RELU,
            ActivationKind::Sigmoid => names::SIGMOID,
            ActivationKind::Tanh => names::TANH,
            ActivationKind::Softmax => names::SOFTMAX,
        }
    }
}

/// An attribute-free, shape-preserving layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    kind: ActivationKind,
    out: Dims,
}

impl Activation {
    pub fn new(kind: ActivationKind, input: Dims) -> Self {
        Self { kind, out: input }
    }

    pub fn kind(&self) -> ActivationKind {
        self.kind
    }
}

/// A meta-block holding the projection branch of a [`Residual`].
///
/// Its output dimensions are its *input* dimensions, so the residual branch
/// that follows it inside a `Residual` sees the residual's own input.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    children: Vec<Block>,
    input: Dims,
}

impl Projection {
    pub fn new(input: Dims, children: Vec<Block>) -> Self {
        Self { children, input }
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }

    /// Give up ownership of the projection branch.
    pub fn into_children(self) -> Vec<Block> {
        self.children
    }
}

/// A residual grouping with an optional projection branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Residual {
    projection: Option<Vec<Block>>,
    residual: Vec<Block>,
    out: Dims,
}

impl Residual {
    /// Create a residual grouping.
    ///
    /// The output is the last residual-branch block's output, or `input` if
    /// the branch is empty.
    pub fn new(input: Dims, projection: Option<Vec<Block>>, residual: Vec<Block>) -> Self {
        let out = residual.last().map_or(input, Block::out_dims);
        Self {
            projection,
            residual,
            out,
        }
    }

    /// The projection branch, if one was declared.
    pub fn projection(&self) -> Option<&[Block]> {
        self.projection.as_deref()
    }

    /// The residual branch.
    pub fn residual(&self) -> &[Block] {
        &self.residual
    }
}

/// Repeats its body `count` times. The body is shape-preserving.
#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    count: usize,
    children: Vec<Block>,
    input: Dims,
}

impl Repeat {
    pub fn new(input: Dims, count: usize, children: Vec<Block>) -> Self {
        Self {
            count,
            children,
            input,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }
}

/// A block produced by a caller-registered creator.
#[derive(Debug, Clone, PartialEq)]
pub struct Custom {
    name: String,
    attrs: Attributes,
    children: Vec<Block>,
    out: Dims,
}

impl Custom {
    pub fn new(
        name: impl Into<String>,
        attrs: Attributes,
        children: Vec<Block>,
        out: Dims,
    ) -> Self {
        Self {
            name: name.into(),
            attrs,
            children,
            out,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_conv_default_stride() {
        let conv = Conv::new(Dims::new(112, 14, 64), 3, 3, 64, 1, 1);
        assert_eq!(Block::Conv(conv).out_dims(), Dims::new(110, 12, 64));
    }

    #[test]
    fn test_conv_strided() {
        let conv = Conv::new(Dims::new(226, 117, 3), 3, 5, 64, 2, 4);
        assert_eq!(conv.out, Dims::new(112, 29, 64));
    }

    #[test]
    fn test_window_output_clamps_to_zero() {
        assert_eq!(window_output(1, 3, 1), 0);
        assert_eq!(window_output(0, 7, 1), 0);
        // Floor division: 1 + floor(-1 / 2) = 0.
        assert_eq!(window_output(2, 3, 2), 0);
        assert_eq!(window_output(3, 3, 2), 1);
    }

    #[test]
    fn test_window_output_large_operands() {
        assert_eq!(window_output(1 << 63, 1, 1), 1 << 63);
        assert_eq!(window_output(10_000_000_000_000_000_000, 3, 1), 9_999_999_999_999_999_998);
        assert_eq!(window_output(usize::MAX, usize::MAX, 1), 1);
        assert_eq!(window_output(0, usize::MAX, usize::MAX), 0);
        assert_eq!(window_output(usize::MAX, 1, usize::MAX), 1);
    }

    #[test]
    fn test_padding_saturates() {
        let padding = Padding::new(Dims::new(2, 2, 1), 0, usize::MAX, 0, usize::MAX);
        assert_eq!(padding.out, Dims::new(usize::MAX, 2, 1));
    }

    #[test]
    fn test_padding_is_additive() {
        let padding = Padding::new(Dims::new(224, 113, 3), 1, 0, 3, 2);
        assert_eq!(padding.out, Dims::new(226, 117, 3));
    }

    #[test]
    fn test_pool_keeps_depth() {
        let pool = Pool::new(PoolKind::Max, Dims::new(112, 112, 64), 2, 2, 2, 2);
        let block = Block::Pool(pool);
        assert_eq!(block.out_dims(), Dims::new(56, 56, 64));
        assert_eq!(block.type_name(), "MaxPool");
    }

    #[test]
    fn test_projection_reports_input() {
        let input = Dims::new(56, 56, 64);
        let conv = Block::Conv(Conv::new(input, 1, 1, 128, 2, 2));
        let projection = Block::Projection(Projection::new(input, vec![conv]));
        assert_eq!(projection.out_dims(), input);
    }

    #[test]
    fn test_residual_children_order() {
        let input = Dims::new(8, 8, 4);
        let proj = Block::Conv(Conv::new(input, 1, 1, 8, 1, 1));
        let body = Block::Conv(Conv::new(input, 1, 1, 8, 1, 1));
        let residual = Block::Residual(Residual::new(
            input,
            Some(vec![proj.clone()]),
            vec![body.clone()],
        ));

        assert_eq!(residual.children(), vec![&proj, &body]);
        assert_eq!(residual.node_count(), 3);
        assert_eq!(residual.out_dims(), Dims::new(8, 8, 8));
    }

    #[test]
    fn test_type_names() {
        let input = Dims::new(1, 1, 1);
        assert_eq!(Block::Root(Root::new(input, Vec::new())).type_name(), "");
        assert_eq!(
            Block::Activation(Activation::new(ActivationKind::Softmax, input)).type_name(),
            "Softmax"
        );
        assert_eq!(Block::FullyConnected(FullyConnected::new(10)).type_name(), "FC");
        assert_eq!(
            Block::Custom(Custom::new("Dropout", Attributes::new(), Vec::new(), input))
                .type_name(),
            "Dropout"
        );
    }

    proptest! {
        #[test]
        fn window_output_matches_floor_formula(
            input in 0usize..512,
            window in 1usize..32,
            stride in 1usize..8,
        ) {
            let expected = (1 + (input as i64 - window as i64).div_euclid(stride as i64)).max(0);
            prop_assert_eq!(window_output(input, window, stride) as i64, expected);
        }

        #[test]
        fn padding_adds_to_spatial_axes(
            w in 0usize..256, h in 0usize..256, d in 0usize..64,
            t in 0usize..8, r in 0usize..8, b in 0usize..8, l in 0usize..8,
        ) {
            let padding = Padding::new(Dims::new(w, h, d), t, r, b, l);
            prop_assert_eq!(padding.out, Dims::new(w + l + r, h + t + b, d));
        }
    }
}
