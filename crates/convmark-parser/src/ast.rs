//! The parsed, untyped syntax tree.
//!
//! Every source line that declares a block becomes one [`AstNode`]. The nodes
//! of a file are gathered under a synthetic root with an empty name, no
//! attributes and no source line.

use std::fmt;

use serde::Serialize;

use convmark_core::Attributes;

/// A node in a parsed markup file.
///
/// Nodes are built once by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstNode {
    line: Option<usize>,
    name: String,
    attrs: Attributes,
    children: Vec<AstNode>,
}

impl AstNode {
    /// Create a node declared on the given 0-based line.
    pub fn new(
        line: usize,
        name: impl Into<String>,
        attrs: Attributes,
        children: Vec<AstNode>,
    ) -> Self {
        Self {
            line: Some(line),
            name: name.into(),
            attrs,
            children,
        }
    }

    /// Create the synthetic root holding a file's top-level blocks.
    pub fn root(children: Vec<AstNode>) -> Self {
        Self {
            line: None,
            name: String::new(),
            attrs: Attributes::new(),
            children,
        }
    }

    /// The 0-based source line. `None` for the synthetic root.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// The block name. Empty for the synthetic root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn children(&self) -> &[AstNode] {
        &self.children
    }

    /// Returns `true` for the synthetic root node.
    pub fn is_root(&self) -> bool {
        self.line.is_none()
    }

    /// Number of nodes in this tree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(AstNode::node_count)
            .sum::<usize>()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        write!(f, "{indent}{}", self.name)?;
        if !self.attrs.is_empty() {
            let attrs = self
                .attrs
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "({attrs})")?;
        }
        if self.children.is_empty() {
            return writeln!(f);
        }
        writeln!(f, " {{")?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        writeln!(f, "{indent}}}")
    }
}

/// Renders the tree back to canonical source text.
///
/// The root prints only its children. Blocks with a body print as
/// `Name(attrs) {` followed by the body indented four spaces and a closing
/// `}` line.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            for child in &self.children {
                child.fmt_indented(f, 0)?;
            }
            Ok(())
        } else {
            self.fmt_indented(f, 0)
        }
    }
}
