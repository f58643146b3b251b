//! Creators for the built-in blocks.
//!
//! Each creator validates its children and attributes, then builds the
//! matching [`Block`] variant. [`defaults`] is the single source of truth for
//! which names the default [`Registry`] knows about.

use log::trace;

use convmark_core::{
    Attributes, Block, Dims,
    block::{
        Activation, ActivationKind, Assert, Conv, FullyConnected, Input, Linear, Padding, Pool,
        PoolKind, Projection, Repeat, Residual, Resize, Root,
    },
    names,
};

use crate::{
    attributes::{AttributeSchema, expect_children, expect_no_children},
    error::BlockError,
    registry::Registry,
};

/// Create the registry holding every built-in creator.
pub fn defaults() -> Registry {
    Registry::empty()
        .with(names::ROOT, create_root)
        .with(names::INPUT, create_input)
        .with(names::ASSERT, create_assert)
        .with(names::CONV, create_conv)
        .with(names::MAX_POOL, pool_creator(PoolKind::Max))
        .with(names::MEAN_POOL, pool_creator(PoolKind::Mean))
        .with(names::PADDING, create_padding)
        .with(names::RESIZE, create_resize)
        .with(names::FC, create_fc)
        .with(names::LINEAR, create_linear)
        .with(names::BATCH_NORM, activation_creator(ActivationKind::BatchNorm))
        .with(names::RELU, activation_creator(ActivationKind::ReLU))
        .with(names::SIGMOID, activation_creator(ActivationKind::Sigmoid))
        .with(names::TANH, activation_creator(ActivationKind::Tanh))
        .with(names::SOFTMAX, activation_creator(ActivationKind::Softmax))
        .with(names::PROJECTION, create_projection)
        .with(names::RESIDUAL, create_residual)
        .with(names::REPEAT, create_repeat)
}

/// Create the root sequencing block. Its output is the last child's output.
pub fn create_root(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    AttributeSchema::new().validate(attrs)?;
    expect_children(&children)?;
    Ok(Block::Root(Root::new(input, children)))
}

/// Create an `Input` block, which ignores the inherited dimensions.
pub fn create_input(
    _input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    expect_no_children(&children)?;
    let attrs = AttributeSchema::new()
        .required_int("w", 1)
        .required_int("h", 1)
        .required_int("d", 1)
        .validate(attrs)?;

    Ok(Block::Input(Input::new(Dims::new(
        attrs.int_or("w", 1),
        attrs.int_or("h", 1),
        attrs.int_or("d", 1),
    ))))
}

/// Create an `Assert` block, failing unless the inherited dimensions match.
pub fn create_assert(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    expect_no_children(&children)?;
    let attrs = AttributeSchema::new()
        .required_int("w", 0)
        .required_int("h", 0)
        .required_int("d", 0)
        .validate(attrs)?;

    let expected = Dims::new(
        attrs.int_or("w", 0),
        attrs.int_or("h", 0),
        attrs.int_or("d", 0),
    );
    if input != expected {
        return Err(BlockError::ShapeMismatch {
            expected,
            actual: input,
        });
    }
    Ok(Block::Assert(Assert::new(expected)))
}

/// Create a `Conv` block. Strides default to 1.
pub fn create_conv(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    expect_no_children(&children)?;
    let attrs = AttributeSchema::new()
        .required_int("w", 1)
        .required_int("h", 1)
        .required_int("n", 1)
        .optional_int("sx", 1)
        .optional_int("sy", 1)
        .validate(attrs)?;

    Ok(Block::Conv(Conv::new(
        input,
        attrs.int_or("w", 1),
        attrs.int_or("h", 1),
        attrs.int_or("n", 1),
        attrs.int_or("sx", 1),
        attrs.int_or("sy", 1),
    )))
}

/// Make a creator for pooling blocks of the given kind.
///
/// Strides default to the pool size, so pools do not overlap unless asked
/// to.
pub fn pool_creator(
    kind: PoolKind,
) -> impl Fn(Dims, &Attributes, Vec<Block>) -> Result<Block, BlockError> + Send + Sync + 'static {
    move |input, attrs, children| {
        expect_no_children(&children)?;
        let attrs = AttributeSchema::new()
            .required_int("w", 1)
            .required_int("h", 1)
            .optional_int("sx", 1)
            .optional_int("sy", 1)
            .validate(attrs)?;

        let width = attrs.int_or("w", 1);
        let height = attrs.int_or("h", 1);
        Ok(Block::Pool(Pool::new(
            kind,
            input,
            width,
            height,
            attrs.int_or("sx", width),
            attrs.int_or("sy", height),
        )))
    }
}

/// Create a `Padding` block. Absent sides are not padded.
pub fn create_padding(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    expect_no_children(&children)?;
    let attrs = AttributeSchema::new()
        .optional_int("t", 0)
        .optional_int("r", 0)
        .optional_int("b", 0)
        .optional_int("l", 0)
        .validate(attrs)?;

    Ok(Block::Padding(Padding::new(
        input,
        attrs.int_or("t", 0),
        attrs.int_or("r", 0),
        attrs.int_or("b", 0),
        attrs.int_or("l", 0),
    )))
}

/// Create a `Resize` block. The inherited input must not be empty.
pub fn create_resize(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    expect_no_children(&children)?;
    let attrs = AttributeSchema::new()
        .required_int("w", 1)
        .required_int("h", 1)
        .validate(attrs)?;

    if input.is_empty() {
        return Err(BlockError::EmptyInput(input));
    }
    Ok(Block::Resize(Resize::new(
        input,
        attrs.int_or("w", 1),
        attrs.int_or("h", 1),
    )))
}

/// Create an `FC` block producing `1x1xout`.
pub fn create_fc(
    _input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    expect_no_children(&children)?;
    let attrs = AttributeSchema::new()
        .required_int("out", 1)
        .validate(attrs)?;

    Ok(Block::FullyConnected(FullyConnected::new(
        attrs.int_or("out", 1),
    )))
}

/// Create a `Linear` block. `scale` defaults to 1 and `bias` to 0.
pub fn create_linear(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    expect_no_children(&children)?;
    let attrs = AttributeSchema::new()
        .optional_real("scale")
        .optional_real("bias")
        .validate(attrs)?;

    Ok(Block::Linear(Linear::new(
        input,
        attrs.real_or("scale", 1.0),
        attrs.real_or("bias", 0.0),
    )))
}

/// Make a creator for attribute-free, shape-preserving blocks.
pub fn activation_creator(
    kind: ActivationKind,
) -> impl Fn(Dims, &Attributes, Vec<Block>) -> Result<Block, BlockError> + Send + Sync + 'static {
    move |input, attrs, children| {
        expect_no_children(&children)?;
        AttributeSchema::new().validate(attrs)?;
        Ok(Block::Activation(Activation::new(kind, input)))
    }
}

/// Create a `Projection` meta-block.
pub fn create_projection(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    AttributeSchema::new().validate(attrs)?;
    expect_children(&children)?;
    Ok(Block::Projection(Projection::new(input, children)))
}

/// Split a leading `Projection` off a residual's children.
fn split_projection(children: Vec<Block>) -> (Option<Vec<Block>>, Vec<Block>) {
    let mut rest = children.into_iter();
    match rest.next() {
        Some(Block::Projection(projection)) => (Some(projection.into_children()), rest.collect()),
        Some(first) => (None, std::iter::once(first).chain(rest).collect()),
        None => (None, Vec::new()),
    }
}

/// Create a `Residual` block.
///
/// A leading `Projection` child is detached and its children become the
/// projection branch. The residual branch must end with the projection
/// branch's output, or with the residual's own input when there is no
/// projection.
pub fn create_residual(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    AttributeSchema::new().validate(attrs)?;
    expect_children(&children)?;

    let (projection, residual) = split_projection(children);
    let Some(last) = residual.last() else {
        return Err(BlockError::NotEnoughChildren);
    };

    let actual = last.out_dims();
    let expected = projection
        .as_ref()
        .and_then(|branch| branch.last())
        .map_or(input, Block::out_dims);
    trace!(
        has_projection = projection.is_some(),
        expected:% = expected,
        actual:% = actual;
        "Checking residual shape"
    );

    if actual != expected {
        return Err(BlockError::ShapeMismatch { expected, actual });
    }
    Ok(Block::Residual(Residual::new(input, projection, residual)))
}

/// Create a `Repeat` block. A non-empty body must preserve the input shape.
pub fn create_repeat(
    input: Dims,
    attrs: &Attributes,
    children: Vec<Block>,
) -> Result<Block, BlockError> {
    let attrs = AttributeSchema::new()
        .required_int("n", 1)
        .validate(attrs)?;

    let body_out = children.last().map_or(input, Block::out_dims);
    if body_out != input {
        return Err(BlockError::ShapeMismatch {
            expected: input,
            actual: body_out,
        });
    }
    Ok(Block::Repeat(Repeat::new(
        input,
        attrs.int_or("n", 1),
        children,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, f64)]) -> Attributes {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn relu(input: Dims) -> Block {
        Block::Activation(Activation::new(ActivationKind::ReLU, input))
    }

    fn conv(input: Dims, size: usize, count: usize) -> Block {
        Block::Conv(Conv::new(input, size, size, count, 1, 1))
    }

    #[test]
    fn test_input_ignores_inherited() {
        let block = create_input(
            Dims::new(9, 9, 9),
            &attrs(&[("w", 224.0), ("h", 224.0), ("d", 3.0)]),
            vec![],
        )
        .unwrap();
        assert_eq!(block.out_dims(), Dims::new(224, 224, 3));
    }

    #[test]
    fn test_input_rejects_zero() {
        let err = create_input(
            Dims::ZERO,
            &attrs(&[("w", 0.0), ("h", 224.0), ("d", 3.0)]),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err.attribute(), Some("w"));
    }

    #[test]
    fn test_assert_passes_through() {
        let input = Dims::new(224, 224, 3);
        let block = create_assert(
            input,
            &attrs(&[("w", 224.0), ("h", 224.0), ("d", 3.0)]),
            vec![],
        )
        .unwrap();
        assert_eq!(block.out_dims(), input);
    }

    #[test]
    fn test_assert_mismatch_on_each_axis() {
        let checks = [(223.0, 224.0, 3.0), (224.0, 225.0, 3.0), (224.0, 224.0, 4.0)];
        for (w, h, d) in checks {
            let err = create_assert(
                Dims::new(224, 224, 3),
                &attrs(&[("w", w), ("h", h), ("d", d)]),
                vec![],
            )
            .unwrap_err();
            assert!(matches!(err, BlockError::ShapeMismatch { .. }));
        }
    }

    #[test]
    fn test_assert_allows_zero() {
        assert!(
            create_assert(
                Dims::ZERO,
                &attrs(&[("w", 0.0), ("h", 0.0), ("d", 0.0)]),
                vec![]
            )
            .is_ok()
        );
    }

    #[test]
    fn test_conv_rejects_children() {
        let input = Dims::new(8, 8, 3);
        let err = create_conv(
            input,
            &attrs(&[("w", 3.0), ("h", 3.0), ("n", 8.0)]),
            vec![relu(input)],
        )
        .unwrap_err();
        assert_eq!(err, BlockError::UnexpectedChildren);
    }

    #[test]
    fn test_pool_default_stride_is_window() {
        let pool = pool_creator(PoolKind::Mean);
        let block = pool(
            Dims::new(113, 56, 64),
            &attrs(&[("w", 2.0), ("h", 2.0)]),
            vec![],
        )
        .unwrap();
        assert_eq!(block.out_dims(), Dims::new(56, 28, 64));
        assert_eq!(block.type_name(), "MeanPool");
    }

    #[test]
    fn test_pool_explicit_stride() {
        let pool = pool_creator(PoolKind::Max);
        let block = pool(
            Dims::new(112, 112, 64),
            &attrs(&[("w", 3.0), ("h", 3.0), ("sx", 2.0), ("sy", 2.0)]),
            vec![],
        )
        .unwrap();
        assert_eq!(block.out_dims(), Dims::new(55, 55, 64));
    }

    #[test]
    fn test_padding_defaults_to_zero() {
        let input = Dims::new(10, 10, 1);
        let block = create_padding(input, &attrs(&[("l", 1.0)]), vec![]).unwrap();
        assert_eq!(block.out_dims(), Dims::new(11, 10, 1));
    }

    #[test]
    fn test_resize_rejects_empty_input() {
        let err = create_resize(
            Dims::new(0, 10, 3),
            &attrs(&[("w", 5.0), ("h", 5.0)]),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, BlockError::EmptyInput(Dims::new(0, 10, 3)));
    }

    #[test]
    fn test_resize_keeps_depth() {
        let block = create_resize(
            Dims::new(30, 20, 3),
            &attrs(&[("w", 5.0), ("h", 7.0)]),
            vec![],
        )
        .unwrap();
        assert_eq!(block.out_dims(), Dims::new(5, 7, 3));
    }

    #[test]
    fn test_fc_ignores_spatial_input() {
        let block = create_fc(Dims::new(7, 7, 512), &attrs(&[("out", 1000.0)]), vec![]).unwrap();
        assert_eq!(block.out_dims(), Dims::new(1, 1, 1000));
    }

    #[test]
    fn test_linear_defaults() {
        let input = Dims::new(4, 4, 4);
        let block = create_linear(input, &Attributes::new(), vec![]).unwrap();
        let Block::Linear(linear) = &block else {
            panic!("Expected Linear block");
        };
        assert_eq!(linear.scale(), 1.0);
        assert_eq!(linear.bias(), 0.0);
        assert_eq!(block.out_dims(), input);
    }

    #[test]
    fn test_activation_rejects_attributes() {
        let relu = activation_creator(ActivationKind::ReLU);
        let err = relu(Dims::new(1, 1, 1), &attrs(&[("x", 1.0)]), vec![]).unwrap_err();
        assert_eq!(err, BlockError::UnknownAttribute("x".to_string()));
    }

    #[test]
    fn test_projection_requires_children() {
        let err = create_projection(Dims::new(1, 1, 1), &Attributes::new(), vec![]).unwrap_err();
        assert_eq!(err, BlockError::NotEnoughChildren);
    }

    #[test]
    fn test_residual_without_projection() {
        let input = Dims::new(8, 8, 16);
        let block = create_residual(
            input,
            &Attributes::new(),
            vec![conv(input, 1, 16), relu(input)],
        )
        .unwrap();
        assert_eq!(block.out_dims(), input);

        let Block::Residual(residual) = &block else {
            panic!("Expected Residual block");
        };
        assert!(residual.projection().is_none());
        assert_eq!(residual.residual().len(), 2);
    }

    #[test]
    fn test_residual_shape_mismatch() {
        let input = Dims::new(8, 8, 16);
        let err = create_residual(input, &Attributes::new(), vec![conv(input, 1, 32)]).unwrap_err();
        assert_eq!(
            err,
            BlockError::ShapeMismatch {
                expected: input,
                actual: Dims::new(8, 8, 32),
            }
        );
    }

    #[test]
    fn test_residual_with_projection() {
        let input = Dims::new(8, 8, 16);
        let projection = Block::Projection(Projection::new(input, vec![conv(input, 1, 32)]));
        let block = create_residual(
            input,
            &Attributes::new(),
            vec![projection, conv(input, 1, 32)],
        )
        .unwrap();
        assert_eq!(block.out_dims(), Dims::new(8, 8, 32));

        let Block::Residual(residual) = &block else {
            panic!("Expected Residual block");
        };
        assert_eq!(residual.projection().map(<[Block]>::len), Some(1));
        assert_eq!(residual.residual().len(), 1);
    }

    #[test]
    fn test_residual_only_projection() {
        let input = Dims::new(8, 8, 16);
        let projection = Block::Projection(Projection::new(input, vec![relu(input)]));
        let err = create_residual(input, &Attributes::new(), vec![projection]).unwrap_err();
        assert_eq!(err, BlockError::NotEnoughChildren);
    }

    #[test]
    fn test_repeat_requires_positive_count() {
        let err = create_repeat(Dims::new(1, 1, 1), &attrs(&[("n", 0.0)]), vec![]).unwrap_err();
        assert_eq!(
            err,
            BlockError::AttributeBelowMinimum {
                name: "n".to_string(),
                min: 1
            }
        );
    }

    #[test]
    fn test_repeat_body_must_preserve_shape() {
        let input = Dims::new(8, 8, 16);
        for n in [1.0, 2.0, 10.0] {
            let err = create_repeat(input, &attrs(&[("n", n)]), vec![conv(input, 3, 16)])
                .unwrap_err();
            assert!(matches!(err, BlockError::ShapeMismatch { .. }));
        }
    }

    #[test]
    fn test_repeat_empty_body() {
        let input = Dims::new(8, 8, 16);
        let block = create_repeat(input, &attrs(&[("n", 3.0)]), vec![]).unwrap();
        assert_eq!(block.out_dims(), input);
    }

    #[test]
    fn test_root_requires_children() {
        let err = create_root(Dims::ZERO, &Attributes::new(), vec![]).unwrap_err();
        assert_eq!(err, BlockError::NotEnoughChildren);
    }
}
