//! Schema node model.
//!
//! One [`SchemaNode`] per XML element of a host format document. The node kind
//! is a closed enum derived from the tag name; everything else about the element
//! (attributes, text, children) is kept verbatim.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Attribute holding the registry identifier.
pub const ATTR_ID: &str = "id";
/// Attribute holding a reference target identifier.
pub const ATTR_REF_ID: &str = "refId";
/// Attribute holding the structural type name.
pub const ATTR_DATA_NAME: &str = "dataName";
/// Attribute holding the repetition spec.
pub const ATTR_TIMES: &str = "times";
/// Attribute holding a declared width.
pub const ATTR_LENGTH: &str = "length";
/// Attribute holding a constant literal.
pub const ATTR_VALUE: &str = "value";

/// Flavour of a scalar text field. All flavours encode as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `fCSString`, `fString`.
    PlainString,
    /// `fHostString`.
    HostString,
    /// `fCSMessage`.
    Message,
    /// `fCSDynXml`.
    DynamicXml,
}

/// Kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Top-level format definition (`fmtDef`).
    FormatDef,
    /// Record group (`record`, `fCSRecord`).
    RecordGroup,
    /// Repeated group (`fCSList`, `iCollF`).
    RepeatedGroup,
    /// Scalar text field.
    ScalarField(ScalarKind),
    /// Inclusion of another fragment by identifier (`refFmt`).
    Reference,
    /// Literal constant (`constant`).
    Constant,
    /// Fixed-length filler (`fixedLength`).
    Padding,
    /// Encoding hint (any tag ending in `Decor`).
    Decorator,
    /// Any other tag, passed through.
    #[default]
    Generic,
}

impl NodeKind {
    /// Maps an XML tag name to its node kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "fmtDef" => Self::FormatDef,
            "record" | "fCSRecord" => Self::RecordGroup,
            "fCSList" | "iCollF" => Self::RepeatedGroup,
            "fCSString" | "fString" => Self::ScalarField(ScalarKind::PlainString),
            "fHostString" => Self::ScalarField(ScalarKind::HostString),
            "fCSMessage" => Self::ScalarField(ScalarKind::Message),
            "fCSDynXml" => Self::ScalarField(ScalarKind::DynamicXml),
            "refFmt" => Self::Reference,
            "constant" => Self::Constant,
            "fixedLength" => Self::Padding,
            t if t.ends_with("Decor") => Self::Decorator,
            _ => Self::Generic,
        }
    }

    /// Returns true for kinds that end a decorator lookahead scan.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ScalarField(_) | Self::RecordGroup | Self::RepeatedGroup
        )
    }
}

/// Where a node was declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    /// Document name.
    pub source: String,
    /// 1-based line number.
    pub line: usize,
}

impl Provenance {
    /// Creates a provenance record.
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}", self.source, self.line)
    }
}

/// A single element of a schema document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Raw tag name.
    pub tag_name: String,
    /// Node kind derived from the tag.
    #[serde(skip)]
    pub kind: NodeKind,
    /// Registry identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Reference target identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// Remaining attributes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Accumulated non-whitespace text.
    #[serde(rename = "textContent", skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Ordered children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SchemaNode>,
    /// Declaration site.
    #[serde(skip)]
    pub provenance: Provenance,
}

impl SchemaNode {
    /// Creates a node for `tag_name` with its kind resolved.
    pub fn new(tag_name: impl Into<String>) -> Self {
        let tag_name = tag_name.into();
        Self {
            kind: NodeKind::from_tag(&tag_name),
            tag_name,
            ..Self::default()
        }
    }

    /// Builder-style attribute setter; `id` and `refId` are promoted.
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.add_child(child);
        self
    }

    /// Sets an attribute; `id` and `refId` are promoted to their own fields.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        match key {
            ATTR_ID => self.id = Some(value.into()),
            ATTR_REF_ID => self.ref_id = Some(value.into()),
            _ => {
                self.attributes.insert(key.to_string(), value.into());
            }
        }
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Structural type name (`dataName`), if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.attr(ATTR_DATA_NAME)
    }

    /// Repetition spec (`times`), if any.
    #[must_use]
    pub fn times(&self) -> Option<&str> {
        self.attr(ATTR_TIMES)
    }

    /// Appends a child.
    pub fn add_child(&mut self, child: SchemaNode) {
        self.children.push(child);
    }

    /// Appends text; whitespace-only fragments are dropped.
    pub fn append_text(&mut self, text: &str) {
        if !text.trim().is_empty() {
            self.text.push_str(text);
        }
    }

    /// Value of a constant node: the `value` attribute, else the text content.
    #[must_use]
    pub fn constant_value(&self) -> &str {
        self.attr(ATTR_VALUE).unwrap_or(&self.text)
    }

    /// Canonical JSON dump of the subtree.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Only strings, maps and vectors; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Pretty-printed JSON dump of the subtree.
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Address of a node inside a forest: root index, then child indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath {
    /// Index of the root in the forest.
    pub root: usize,
    /// Child indices from the root down.
    pub children: Vec<usize>,
}

impl NodePath {
    /// Path of a root node.
    #[must_use]
    pub const fn root(root: usize) -> Self {
        Self {
            root,
            children: Vec::new(),
        }
    }

    /// Path of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut children = self.children.clone();
        children.push(index);
        Self {
            root: self.root,
            children,
        }
    }

    /// Same path in a forest where roots start at `offset`.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.root += offset;
        self
    }

    /// Resolves the path against a forest.
    #[must_use]
    pub fn resolve<'a>(&self, roots: &'a [SchemaNode]) -> Option<&'a SchemaNode> {
        let mut node = roots.get(self.root)?;
        for &index in &self.children {
            node = node.children.get(index)?;
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(NodeKind::from_tag("fmtDef"), NodeKind::FormatDef);
        assert_eq!(NodeKind::from_tag("record"), NodeKind::RecordGroup);
        assert_eq!(NodeKind::from_tag("fCSRecord"), NodeKind::RecordGroup);
        assert_eq!(NodeKind::from_tag("fCSList"), NodeKind::RepeatedGroup);
        assert_eq!(NodeKind::from_tag("iCollF"), NodeKind::RepeatedGroup);
        assert_eq!(
            NodeKind::from_tag("fString"),
            NodeKind::ScalarField(ScalarKind::PlainString)
        );
        assert_eq!(
            NodeKind::from_tag("fHostString"),
            NodeKind::ScalarField(ScalarKind::HostString)
        );
        assert_eq!(
            NodeKind::from_tag("fCSMessage"),
            NodeKind::ScalarField(ScalarKind::Message)
        );
        assert_eq!(
            NodeKind::from_tag("fCSDynXml"),
            NodeKind::ScalarField(ScalarKind::DynamicXml)
        );
        assert_eq!(NodeKind::from_tag("refFmt"), NodeKind::Reference);
        assert_eq!(NodeKind::from_tag("constant"), NodeKind::Constant);
        assert_eq!(NodeKind::from_tag("fixedLength"), NodeKind::Padding);
        assert_eq!(NodeKind::from_tag("numDecor"), NodeKind::Decorator);
        assert_eq!(NodeKind::from_tag("delimDecor"), NodeKind::Decorator);
        assert_eq!(NodeKind::from_tag("kColl"), NodeKind::Generic);
        assert_eq!(NodeKind::from_tag("Decorx"), NodeKind::Generic);
    }

    #[test]
    fn test_structural_kinds() {
        assert!(NodeKind::RecordGroup.is_structural());
        assert!(NodeKind::RepeatedGroup.is_structural());
        assert!(NodeKind::ScalarField(ScalarKind::Message).is_structural());
        assert!(!NodeKind::Decorator.is_structural());
        assert!(!NodeKind::Constant.is_structural());
    }

    #[test]
    fn test_attr_promotion() {
        let node = SchemaNode::new("record")
            .with_attr("id", "R1")
            .with_attr("refId", "R2")
            .with_attr("dataName", "Customer")
            .with_attr("times", "*");
        assert_eq!(node.id.as_deref(), Some("R1"));
        assert_eq!(node.ref_id.as_deref(), Some("R2"));
        assert_eq!(node.type_name(), Some("Customer"));
        assert_eq!(node.times(), Some("*"));
        assert!(node.attr("id").is_none());
        assert_eq!(node.attributes.len(), 2);
    }

    #[test]
    fn test_attr_last_write_wins() {
        let node = SchemaNode::new("fString")
            .with_attr("dataName", "A")
            .with_attr("dataName", "B");
        assert_eq!(node.type_name(), Some("B"));
    }

    #[test]
    fn test_append_text_skips_whitespace() {
        let mut node = SchemaNode::new("constant");
        node.append_text("  \n ");
        assert!(node.text.is_empty());
        node.append_text("HDR");
        node.append_text(" X");
        assert_eq!(node.text, "HDR X");
    }

    #[test]
    fn test_constant_value_prefers_attribute() {
        let from_text = {
            let mut n = SchemaNode::new("constant");
            n.append_text("TXT");
            n
        };
        assert_eq!(from_text.constant_value(), "TXT");
        let from_attr = from_text.clone().with_attr("value", "ATTR");
        assert_eq!(from_attr.constant_value(), "ATTR");
    }

    #[test]
    fn test_to_json_omits_empty_fields() {
        let node = SchemaNode::new("fmtDef").with_attr("id", "F");
        assert_eq!(node.to_json(), r#"{"tagName":"fmtDef","id":"F"}"#);
    }

    #[test]
    fn test_to_json_full() {
        let mut constant = SchemaNode::new("constant");
        constant.append_text("HDR");
        let node = SchemaNode::new("record")
            .with_attr("id", "R")
            .with_attr("refId", "X")
            .with_attr("dataName", "Rec")
            .with_child(constant);
        assert_eq!(
            node.to_json(),
            r#"{"tagName":"record","id":"R","refId":"X","attributes":{"dataName":"Rec"},"children":[{"tagName":"constant","textContent":"HDR"}]}"#
        );
    }

    #[test]
    fn test_node_path_resolve() {
        let roots = vec![
            SchemaNode::new("fmtDef"),
            SchemaNode::new("fmtDef")
                .with_child(SchemaNode::new("record").with_child(SchemaNode::new("fString"))),
        ];
        let path = NodePath::root(1).child(0).child(0);
        assert_eq!(path.resolve(&roots).map(|n| n.tag_name.as_str()), Some("fString"));
        assert!(NodePath::root(0).child(3).resolve(&roots).is_none());
        assert_eq!(NodePath::root(0).offset(1), NodePath::root(1));
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::new("a.xml", 3).to_string(), "a.xml line 3");
    }
}
