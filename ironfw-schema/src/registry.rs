//! Unified schema registry.
//!
//! Format fragments are spread over many documents and refer to each other by
//! identifier. The [`Registry`] owns every parsed root and one global
//! identifier index across all of them.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::node::{NodePath, SchemaNode};
use crate::parser::ParsedDocument;

/// An identifier that was registered more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    /// The repeated identifier.
    pub id: String,
    /// Node that lost the index entry (still reachable via the roots).
    pub replaced: NodePath,
    /// Node that now owns the index entry.
    pub replacement: NodePath,
}

/// Forest of schema roots plus a global identifier index.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    roots: Vec<SchemaNode>,
    ids: HashMap<String, NodePath>,
    overrides: Vec<Override>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends roots and merges their identifier index.
    ///
    /// `ids` paths are relative to `roots`. On an identifier collision the new
    /// node replaces the old one in the index; both stay reachable as roots.
    pub fn register(&mut self, roots: Vec<SchemaNode>, ids: HashMap<String, NodePath>) {
        let offset = self.roots.len();
        self.roots.extend(roots);

        let mut ids: Vec<_> = ids.into_iter().collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));

        for (id, path) in ids {
            let path = path.offset(offset);
            if let Some(previous) = self.ids.insert(id.clone(), path.clone()) {
                warn!(id = %id, "identifier registered twice; later definition wins");
                self.overrides.push(Override {
                    id,
                    replaced: previous,
                    replacement: path,
                });
            }
        }
        debug!(roots = self.roots.len(), ids = self.ids.len(), "registry merged");
    }

    /// Registers a parsed document.
    ///
    /// Identifiers the document repeats internally are recorded as overrides
    /// before any collision with earlier documents.
    pub fn register_document(&mut self, document: ParsedDocument) {
        debug!(source = %document.source, "registering document");
        let offset = self.roots.len();
        for duplicate in document.duplicates {
            warn!(id = %duplicate.id, source = %document.source, "identifier registered twice; later definition wins");
            self.overrides.push(Override {
                id: duplicate.id,
                replaced: duplicate.replaced.offset(offset),
                replacement: duplicate.replacement.offset(offset),
            });
        }
        self.register(document.roots, document.ids);
    }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&SchemaNode> {
        self.ids.get(id).and_then(|path| self.resolve(path))
    }

    /// Resolves a node path against the forest.
    #[must_use]
    pub fn resolve(&self, path: &NodePath) -> Option<&SchemaNode> {
        path.resolve(&self.roots)
    }

    /// Returns true if `id` is indexed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// All roots in registration order.
    #[must_use]
    pub fn roots(&self) -> &[SchemaNode] {
        &self.roots
    }

    /// Number of indexed identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no identifier is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Indexed identifiers in sorted order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.ids.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Identifier collisions seen so far, in registration order.
    #[must_use]
    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }
}

impl FromIterator<ParsedDocument> for Registry {
    fn from_iter<I: IntoIterator<Item = ParsedDocument>>(iter: I) -> Self {
        let mut registry = Self::new();
        for document in iter {
            registry.register_document(document);
        }
        registry
    }
}
