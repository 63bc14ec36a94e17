//! Host format XML document parser.
//!
//! This module turns one XML document into a forest of [`SchemaNode`]s plus the
//! identifier index of that document.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::{EscapeError, resolve_predefined_entity};
use quick_xml::events::{BytesRef, BytesStart, Event};
use tracing::{debug, trace, warn};

use crate::error::ParseError;
use crate::node::{NodePath, Provenance, SchemaNode};
use crate::registry::Override;

/// Result of parsing one document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Document name used in provenance.
    pub source: String,
    /// Top-level elements in document order.
    pub roots: Vec<SchemaNode>,
    /// Identifier to node, relative to `roots`.
    pub ids: HashMap<String, NodePath>,
    /// Identifiers repeated within this document, relative to `roots`.
    pub duplicates: Vec<Override>,
}

impl ParsedDocument {
    /// Looks up a node of this document by identifier.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&SchemaNode> {
        self.ids.get(id).and_then(|path| path.resolve(&self.roots))
    }
}

/// Parses a host format document from a string.
///
/// # Arguments
/// * `source` - Document name recorded in node provenance
/// * `xml` - XML document content
///
/// # Errors
/// Returns `ParseError` if the XML is malformed, unbalanced or has no elements.
pub fn parse_document(source: &str, xml: &str) -> Result<ParsedDocument, ParseError> {
    let lines = LineIndex::new(xml);
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<SchemaNode> = Vec::new();
    let mut roots = Vec::new();
    let mut buf = Vec::new();

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let node = start_node(e, source, lines.line_at(offset))?;
                stack.push(node);
            }
            Ok(Event::Empty(ref e)) => {
                let node = start_node(e, source, lines.line_at(offset))?;
                attach(&mut stack, &mut roots, node);
            }
            Ok(Event::End(ref e)) => {
                let Some(node) = stack.pop() else {
                    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                    return Err(ParseError::unbalanced(source, name, lines.line_at(offset)));
                };
                attach(&mut stack, &mut roots, node);
            }
            Ok(Event::Text(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    top.append_text(std::str::from_utf8(t.as_ref())?);
                }
            }
            Ok(Event::CData(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    top.append_text(std::str::from_utf8(t.as_ref())?);
                }
            }
            Ok(Event::GeneralRef(ref r)) => {
                let resolved = resolve_reference(r)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::unbalanced(
            source,
            open.tag_name.clone(),
            open.provenance.line,
        ));
    }
    if roots.is_empty() {
        return Err(ParseError::empty(source));
    }

    let mut ids = HashMap::new();
    let mut duplicates = Vec::new();
    for (index, root) in roots.iter().enumerate() {
        index_ids(root, NodePath::root(index), &mut ids, &mut duplicates);
    }
    for duplicate in &duplicates {
        warn!(source, id = %duplicate.id, "identifier repeated within document; later definition wins");
    }
    debug!(source, roots = roots.len(), ids = ids.len(), "parsed document");

    Ok(ParsedDocument {
        source: source.to_string(),
        roots,
        ids,
        duplicates,
    })
}

/// Parses a host format document from a file.
///
/// The file name (without directories) is used as the document name.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or parsed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedDocument, ParseError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_document(&source, &xml)
}

/// Builds a node from a start (or empty) element.
fn start_node(e: &BytesStart<'_>, source: &str, line: usize) -> Result<SchemaNode, ParseError> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut node = SchemaNode::new(name);
    node.provenance = Provenance::new(source, line);

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.decode_and_unescape_value(e.decoder())?;
        node.set_attr(key, &*value);
    }

    trace!(tag = %node.tag_name, line, "element");
    Ok(node)
}

/// Expands a character or predefined entity reference found in text.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, ParseError> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(quick_xml::Error::from)?;
    match resolve_predefined_entity(&name) {
        Some(text) => Ok(text.to_string()),
        None => Err(ParseError::Xml(
            EscapeError::UnrecognizedEntity(0..name.len(), name.into_owned()).into(),
        )),
    }
}

/// Attaches a finished node to its parent, or to the roots at top level.
fn attach(stack: &mut [SchemaNode], roots: &mut Vec<SchemaNode>, node: SchemaNode) {
    match stack.last_mut() {
        Some(parent) => parent.add_child(node),
        None => roots.push(node),
    }
}

/// Indexes identifiers in document (pre-)order; later duplicates win.
fn index_ids(
    node: &SchemaNode,
    path: NodePath,
    ids: &mut HashMap<String, NodePath>,
    duplicates: &mut Vec<Override>,
) {
    if let Some(id) = &node.id {
        if let Some(previous) = ids.insert(id.clone(), path.clone()) {
            duplicates.push(Override {
                id: id.clone(),
                replaced: previous,
                replacement: path.clone(),
            });
        }
    }
    for (index, child) in node.children.iter().enumerate() {
        index_ids(child, path.child(index), ids, duplicates);
    }
}

/// Byte offset to 1-based line lookup.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line_at(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}
