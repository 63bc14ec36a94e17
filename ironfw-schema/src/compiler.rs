//! Structural type compiler.
//!
//! Walks a root fragment depth-first and produces one [`StructuralType`] per
//! distinct sanitized type name. References are spliced inline, untyped groups
//! are transparent, and every problem becomes a [`Diagnostic`] rather than an
//! error.

use ironfw_core::layout::FieldLayout;
use tracing::{debug, warn};

use crate::ir::{
    CodecStep, Diagnostic, ItemType, NameScope, Property, PropertyKind, Repetition,
    StructuralType, TypeId, TypeTable, sanitize_name,
};
use crate::layout::{resolve_constant_width, resolve_field_layout, resolve_item_layout};
use crate::node::{ATTR_LENGTH, NodeKind, SchemaNode};
use crate::registry::Registry;

/// Compiles the fragment registered as `root_id` into a type table.
///
/// The root type is named after the sanitized identifier. An unknown root
/// yields an empty table carrying a [`Diagnostic::RootNotFound`].
#[must_use]
pub fn compile(registry: &Registry, root_id: &str) -> TypeTable {
    let mut compiler = Compiler {
        registry,
        table: TypeTable::new(),
        in_progress: Vec::new(),
    };

    match registry.lookup(root_id) {
        Some(root) => {
            let (id, _) = compiler.compile_type(sanitize_name(root_id), root);
            compiler.table.set_root(id);
            debug!(
                root = root_id,
                types = compiler.table.len(),
                diagnostics = compiler.table.diagnostics().len(),
                "compiled root"
            );
        }
        None => {
            warn!(root = root_id, "root not found");
            compiler.table.push_diagnostic(Diagnostic::RootNotFound {
                id: root_id.to_string(),
            });
        }
    }

    compiler.table
}

struct Compiler<'r> {
    registry: &'r Registry,
    table: TypeTable,
    in_progress: Vec<TypeId>,
}

/// State of the type currently being filled in.
struct TypeBuilder {
    name: String,
    names: NameScope,
    properties: Vec<Property>,
    steps: Vec<CodecStep>,
    repetition: Option<Repetition>,
    splicing: Vec<String>,
}

impl TypeBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            names: NameScope::new(),
            properties: Vec::new(),
            steps: Vec::new(),
            repetition: None,
            splicing: Vec::new(),
        }
    }

    fn push_property(&mut self, property: Property) -> usize {
        self.properties.push(property);
        self.properties.len() - 1
    }
}

impl<'r> Compiler<'r> {
    /// Returns the type named `name`, compiling `body`'s children on first
    /// encounter. The flag is true if the type is still on the DFS stack.
    fn compile_type(&mut self, name: String, body: &'r SchemaNode) -> (TypeId, bool) {
        if let Some(id) = self.table.find(&name) {
            return (id, self.in_progress.contains(&id));
        }

        debug!(type_name = %name, source = %body.provenance, "compiling type");
        let id = self
            .table
            .reserve(StructuralType::new(name.clone(), body.provenance.clone()));
        self.in_progress.push(id);

        let mut builder = TypeBuilder::new(name);
        builder.splicing.extend(body.id.clone());
        self.walk_children(&mut builder, &body.children);

        self.in_progress.pop();
        let ty = self.table.get_mut(id);
        ty.properties = builder.properties;
        ty.steps = builder.steps;
        (id, false)
    }

    fn walk_children(&mut self, builder: &mut TypeBuilder, children: &'r [SchemaNode]) {
        for index in 0..children.len() {
            self.walk_node(builder, children, index);
        }
    }

    fn walk_node(&mut self, builder: &mut TypeBuilder, siblings: &'r [SchemaNode], index: usize) {
        let node = &siblings[index];
        match node.kind {
            NodeKind::RecordGroup => match node.type_name() {
                Some(data_name) => self.typed_record(builder, node, data_name),
                None => self.walk_transparent(builder, node),
            },
            NodeKind::RepeatedGroup => match node.type_name() {
                Some(data_name) => self.typed_list(builder, node, data_name),
                None => self.repeat_context(builder, node),
            },
            NodeKind::ScalarField(_) => {
                if let Some(data_name) = node.type_name() {
                    let layout = resolve_field_layout(siblings, index);
                    let name = builder.names.unique(&sanitize_name(data_name));
                    let property = builder.push_property(Property {
                        name,
                        kind: PropertyKind::Text { layout },
                        recursive: false,
                        provenance: node.provenance.clone(),
                    });
                    if let Some(layout) = layout {
                        builder.steps.push(CodecStep::Field { property, layout });
                    }
                }
            }
            NodeKind::Reference => self.splice_reference(builder, node),
            NodeKind::Constant => {
                if let Some(width) = resolve_constant_width(siblings, index) {
                    builder.steps.push(CodecStep::Constant {
                        value: node.constant_value().to_string(),
                        width,
                    });
                }
            }
            NodeKind::Padding => self.padding(builder, node),
            NodeKind::Decorator => {}
            NodeKind::FormatDef | NodeKind::Generic => self.walk_transparent(builder, node),
        }
    }

    /// Walks a transparent container; a `times` attribute on it opens a
    /// repetition context.
    fn walk_transparent(&mut self, builder: &mut TypeBuilder, node: &'r SchemaNode) {
        if node.times().is_some() {
            self.repeat_context(builder, node);
        } else {
            self.walk_children(builder, &node.children);
        }
    }

    fn typed_record(&mut self, builder: &mut TypeBuilder, node: &'r SchemaNode, data_name: &str) {
        let type_name = sanitize_name(data_name);
        let name = builder.names.unique(&type_name);
        let (target, recursive) = self.compile_type(type_name, node);

        let (kind, list) = match builder.repetition {
            Some(repetition) => (
                PropertyKind::List {
                    item: ItemType::Record(target),
                    repetition,
                },
                true,
            ),
            None => (PropertyKind::Nested { target }, false),
        };
        let property = builder.push_property(Property {
            name,
            kind,
            recursive,
            provenance: node.provenance.clone(),
        });
        builder.steps.push(if list {
            CodecStep::List { property }
        } else {
            CodecStep::Nested { property }
        });
    }

    fn typed_list(&mut self, builder: &mut TypeBuilder, node: &'r SchemaNode, data_name: &str) {
        let base = sanitize_name(data_name);
        let name = builder.names.unique(&base);
        let repetition = Repetition::parse(node.times());

        let (item, recursive) = match self.find_item_node(node) {
            Ok(Some(item_node)) => {
                let item_name = match item_node.type_name() {
                    Some(item_name) => sanitize_name(item_name),
                    None => format!("{base}Item"),
                };
                let (id, recursive) = self.compile_type(item_name, item_node);
                (ItemType::Record(id), recursive)
            }
            Ok(None) => (ItemType::Text(resolve_item_layout(&node.children)), false),
            Err((reference, reference_node)) => {
                self.unresolved(builder, reference, reference_node);
                (ItemType::Text(None), false)
            }
        };

        let property = builder.push_property(Property {
            name,
            kind: PropertyKind::List { item, repetition },
            recursive,
            provenance: node.provenance.clone(),
        });
        builder.steps.push(CodecStep::List { property });
    }

    /// Walks an untyped repeating container with its repetition in effect.
    fn repeat_context(&mut self, builder: &mut TypeBuilder, node: &'r SchemaNode) {
        let saved = builder
            .repetition
            .replace(Repetition::parse(node.times()));
        self.walk_children(builder, &node.children);
        builder.repetition = saved;
    }

    /// First record child, or the target of the first reference child.
    ///
    /// A reference child whose target is not registered is returned as the
    /// error, together with the reference node.
    fn find_item_node(
        &self,
        list: &'r SchemaNode,
    ) -> Result<Option<&'r SchemaNode>, (&'r str, &'r SchemaNode)> {
        for child in &list.children {
            match child.kind {
                NodeKind::RecordGroup => return Ok(Some(child)),
                NodeKind::Reference => {
                    if let Some(reference) = child.ref_id.as_deref() {
                        return match self.registry.lookup(reference) {
                            Some(target) => Ok(Some(target)),
                            None => Err((reference, child)),
                        };
                    }
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn splice_reference(&mut self, builder: &mut TypeBuilder, node: &'r SchemaNode) {
        let Some(reference) = node.ref_id.as_deref() else {
            debug!(source = %node.provenance, "reference without target skipped");
            return;
        };

        if builder.splicing.iter().any(|r| r == reference) {
            warn!(reference, type_name = %builder.name, "reference cycle");
            builder.steps.push(CodecStep::ReferenceCycle {
                reference: reference.to_string(),
            });
            self.table.push_diagnostic(Diagnostic::ReferenceCycle {
                reference: reference.to_string(),
                in_type: builder.name.clone(),
                provenance: node.provenance.clone(),
            });
            return;
        }

        match self.registry.lookup(reference) {
            Some(target) => {
                builder.splicing.push(reference.to_string());
                self.walk_transparent(builder, target);
                builder.splicing.pop();
            }
            None => self.unresolved(builder, reference, node),
        }
    }

    fn unresolved(&mut self, builder: &mut TypeBuilder, reference: &str, node: &SchemaNode) {
        warn!(reference, type_name = %builder.name, source = %node.provenance, "unresolved reference");
        builder.steps.push(CodecStep::Unresolved {
            reference: reference.to_string(),
        });
        self.table.push_diagnostic(Diagnostic::UnresolvedReference {
            reference: reference.to_string(),
            in_type: builder.name.clone(),
            provenance: node.provenance.clone(),
        });
    }

    fn padding(&mut self, builder: &mut TypeBuilder, node: &SchemaNode) {
        let Some(raw) = node.attr(ATTR_LENGTH) else {
            return;
        };
        match FieldLayout::parse_width(raw) {
            Ok(0) => {}
            Ok(width) => builder.steps.push(CodecStep::Padding { width }),
            Err(_) => {
                warn!(value = raw, source = %node.provenance, "invalid padding length");
                self.table.push_diagnostic(Diagnostic::InvalidPadding {
                    value: raw.to_string(),
                    in_type: builder.name.clone(),
                    provenance: node.provenance.clone(),
                });
            }
        }
    }
}
