//! Field width and justification resolution.
//!
//! A field's width is not declared on the field itself: it comes from the
//! first width-bearing decorator that follows it among its siblings.

use ironfw_core::layout::FieldLayout;

use crate::node::{ATTR_LENGTH, NodeKind, SchemaNode};

/// Resolves the layout of the field at `siblings[index]`.
///
/// Scans forward through the following siblings. The first decorator with a
/// `length` attribute supplies the width (numeric decorators switch to
/// zero-padded, right-justified framing); a scalar field or group sibling ends
/// the scan with no width. An unparseable or zero width also means no width.
#[must_use]
pub fn resolve_field_layout(siblings: &[SchemaNode], index: usize) -> Option<FieldLayout> {
    find_width_decorator(siblings, index).and_then(decorator_layout)
}

/// Resolves the width of the constant at `siblings[index]`.
///
/// Same scan as [`resolve_field_layout`]; constants are always text.
#[must_use]
pub fn resolve_constant_width(siblings: &[SchemaNode], index: usize) -> Option<usize> {
    find_width_decorator(siblings, index).and_then(declared_width)
}

/// Resolves the item layout of a text-item list from its own children.
#[must_use]
pub fn resolve_item_layout(children: &[SchemaNode]) -> Option<FieldLayout> {
    children
        .iter()
        .find(|c| c.kind == NodeKind::Decorator && c.attr(ATTR_LENGTH).is_some())
        .and_then(decorator_layout)
}

/// Returns true for decorator tags that mark a numeric field.
///
/// Matching is case-sensitive: `numDecor` and `decimalDecor` are numeric,
/// `NumberDecor` and `hostDecimalDecor` are not.
#[must_use]
pub fn is_numeric_decorator(tag: &str) -> bool {
    tag.starts_with("num") || tag.contains("decimal")
}

fn find_width_decorator(siblings: &[SchemaNode], index: usize) -> Option<&SchemaNode> {
    for sibling in siblings.iter().skip(index + 1) {
        if sibling.kind == NodeKind::Decorator {
            if sibling.attr(ATTR_LENGTH).is_some() {
                return Some(sibling);
            }
            continue;
        }
        if sibling.kind.is_structural() {
            return None;
        }
    }
    None
}

fn decorator_layout(decorator: &SchemaNode) -> Option<FieldLayout> {
    let width = declared_width(decorator)?;
    if is_numeric_decorator(&decorator.tag_name) {
        Some(FieldLayout::numeric(width))
    } else {
        Some(FieldLayout::text(width))
    }
}

fn declared_width(decorator: &SchemaNode) -> Option<usize> {
    decorator
        .attr(ATTR_LENGTH)
        .and_then(|raw| FieldLayout::parse_width(raw).ok())
        .filter(|&w| w > 0)
}
