//! Registry reference audit.
//!
//! Compilation tolerates dangling references and overridden identifiers; this
//! module reports them up front for the whole registry, independent of any
//! root.

use tracing::debug;

use crate::node::{NodeKind, Provenance, SchemaNode};
use crate::registry::{Override, Registry};

/// A reference whose target identifier is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Missing identifier.
    pub reference: String,
    /// Location of the reference node.
    pub provenance: Provenance,
}

/// Findings of a registry audit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceAudit {
    /// Number of reference nodes inspected.
    pub references: usize,
    /// References that do not resolve, in forest order.
    pub dangling: Vec<DanglingReference>,
    /// Identifiers registered more than once.
    pub overrides: Vec<Override>,
}

impl ReferenceAudit {
    /// Returns true if nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.overrides.is_empty()
    }
}

/// Audits every reference node in the registry.
#[must_use]
pub fn audit_references(registry: &Registry) -> ReferenceAudit {
    let mut audit = ReferenceAudit {
        overrides: registry.overrides().to_vec(),
        ..ReferenceAudit::default()
    };
    for root in registry.roots() {
        audit_node(registry, root, &mut audit);
    }
    debug!(
        references = audit.references,
        dangling = audit.dangling.len(),
        overrides = audit.overrides.len(),
        "reference audit"
    );
    audit
}

fn audit_node(registry: &Registry, node: &SchemaNode, audit: &mut ReferenceAudit) {
    if node.kind == NodeKind::Reference {
        if let Some(reference) = node.ref_id.as_deref() {
            audit.references += 1;
            if !registry.contains(reference) {
                audit.dangling.push(DanglingReference {
                    reference: reference.to_string(),
                    provenance: node.provenance.clone(),
                });
            }
        }
    }
    for child in &node.children {
        audit_node(registry, child, audit);
    }
}
