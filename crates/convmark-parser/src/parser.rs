//! Parser for convmark source text.
//!
//! The grammar is line-oriented: every line is trimmed, lines starting with
//! `#` are comments, empty lines are skipped, and every other line either
//! declares a block or closes one. A declaration has the shape
//!
//! ```text
//! Name
//! Name(attr=value, other=value)
//! Name(attr=value) {
//! ```
//!
//! where a trailing ` {` opens a body that runs until the matching `}` line.
//! Block headers and attribute entries are recognized with winnow; bodies
//! are matched by counting braces over whole lines. The public entry point
//! is [`parse`].

use log::{debug, trace};
use winnow::{
    Parser as _,
    ascii::{alpha1, space0},
    combinator::{delimited, opt, separated_pair},
    error::ModalResult,
    token::{literal, take_till, take_while},
};

use convmark_core::Attributes;

use crate::{
    ast::AstNode,
    error::{ErrorCode, ParseError},
};

/// A block declaration line, before its attributes are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Header<'a> {
    name: &'a str,
    /// The raw text between the parentheses, if there were any.
    attrs: Option<&'a str>,
    opens_body: bool,
}

/// Parse a block name: letters only, possibly empty.
fn block_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(0.., |c: char| c.is_ascii_alphabetic()).parse_next(input)
}

/// Parse a block header: `Name`, optional `(...)`, optional ` {`.
fn block_header<'a>(input: &mut &'a str) -> ModalResult<Header<'a>> {
    (
        block_name,
        opt(delimited('(', take_till(0.., ')'), ')')),
        opt(literal(" {")),
    )
        .map(|(name, attrs, open)| Header {
            name,
            attrs,
            opens_body: open.is_some(),
        })
        .parse_next(input)
}

/// Parse a decimal attribute value such as `3`, `-1` or `0.25`.
fn number(input: &mut &str) -> ModalResult<f64> {
    take_while(1.., |c: char| c.is_ascii_digit() || c == '-' || c == '.')
        .try_map(str::parse::<f64>)
        .verify(|value: &f64| value.is_finite())
        .parse_next(input)
}

/// Parse a single `name=value` entry, allowing surrounding spaces.
fn attribute<'a>(input: &mut &'a str) -> ModalResult<(&'a str, f64)> {
    delimited(space0, separated_pair(alpha1, '=', number), space0).parse_next(input)
}

/// Interpret the raw contents of an attribute list.
fn parse_attributes(line: usize, list: &str) -> Result<Attributes, ParseError> {
    let mut attrs = Attributes::new();
    if list.is_empty() {
        return Ok(attrs);
    }

    for (index, entry) in list.split(',').enumerate() {
        let (name, value) = attribute.parse(entry).map_err(|_| {
            ParseError::new(
                ErrorCode::E101,
                line,
                format!("bad format for attribute {index}"),
            )
            .with_help("attributes are written as `name=value`, e.g. `w=3`")
        })?;

        if attrs.insert(name.to_string(), value).is_some() {
            return Err(ParseError::new(
                ErrorCode::E102,
                line,
                format!("duplicate attribute: {name}"),
            ));
        }
    }

    Ok(attrs)
}

/// Find the line that closes the body opened at `open`.
fn matching_close(lines: &[&str], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, line) in lines.iter().enumerate().skip(open + 1) {
        if *line == "}" {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        } else if line.ends_with('{') {
            depth += 1;
        }
    }
    None
}

/// Parse a run of lines into sibling nodes.
///
/// `offset` is the source line of `lines[0]`.
fn parse_lines(offset: usize, lines: &[&str]) -> Result<Vec<AstNode>, ParseError> {
    let mut nodes = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let text = lines[i];
        let line = offset + i;
        if text.is_empty() {
            i += 1;
            continue;
        }

        let header = block_header.parse(text).map_err(|_| {
            ParseError::new(ErrorCode::E100, line, "invalid block declaration")
                .with_help("expected `Name`, `Name(attr=value, ...)`, optionally followed by ` {`")
        })?;
        trace!(line, name = header.name; "Parsed block header");

        let attrs = parse_attributes(line, header.attrs.unwrap_or_default())?;

        let mut children = Vec::new();
        if header.opens_body {
            let close = matching_close(lines, i).ok_or_else(|| {
                ParseError::new(ErrorCode::E103, line, "no matching }")
                    .with_help("close the block with a `}` on its own line")
            })?;
            children = parse_lines(line + 1, &lines[i + 1..close])?;
            i = close;
        }

        nodes.push(AstNode::new(line, header.name, attrs, children));
        i += 1;
    }
    Ok(nodes)
}

/// Parse source text into the root node of a markup file.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first malformed line. No partial tree is
/// returned.
///
/// # Example
///
/// ```
/// # use convmark_parser::parse;
/// let root = parse("Input(w=28, h=28, d=1)\nFC(out=10)").unwrap();
/// assert_eq!(root.children().len(), 2);
/// assert_eq!(root.children()[1].name(), "FC");
/// ```
pub fn parse(source: &str) -> Result<AstNode, ParseError> {
    let lines: Vec<&str> = source
        .split('\n')
        .map(|line| {
            let line = line.trim();
            if line.starts_with('#') { "" } else { line }
        })
        .collect();
    debug!(lines = lines.len(); "Parsing source");

    let children = parse_lines(0, &lines)?;
    let root = AstNode::root(children);

    debug!(nodes = root.node_count() - 1; "Parsed source");
    Ok(root)
}
