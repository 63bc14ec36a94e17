//! Intermediate representation for code generation.
//!
//! The compiler turns a schema fragment into a [`TypeTable`]: an arena of
//! [`StructuralType`]s, each with named properties and the ordered codec steps
//! that frame it on the wire. Encoders and decoders are both driven by the same
//! steps, so they cannot disagree on layout.

use std::collections::{HashMap, HashSet};
use std::fmt;

use ironfw_core::layout::FieldLayout;

use crate::node::Provenance;

/// Index of a type in a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    /// Position in the table's discovery order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// How many items a list holds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
    /// As many items as the value holds; decoding runs to end of input.
    Dynamic,
    /// Exactly this many items.
    Fixed(usize),
}

impl Repetition {
    /// Parses a `times` attribute.
    ///
    /// `*` is dynamic, a non-negative integer is a fixed count, and anything
    /// else (including a missing attribute) is a fixed count of one.
    #[must_use]
    pub fn parse(spec: Option<&str>) -> Self {
        match spec.map(str::trim) {
            Some("*") => Self::Dynamic,
            Some(count) => count.parse().map_or(Self::Fixed(1), Self::Fixed),
            None => Self::Fixed(1),
        }
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => write!(f, "*"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// Item type of a list property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    /// Items are records of a compiled type.
    Record(TypeId),
    /// Items are text, framed by the layout if one was declared.
    Text(Option<FieldLayout>),
}

/// Shape of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Scalar text. Without a layout the field contributes no characters.
    Text {
        /// Resolved framing.
        layout: Option<FieldLayout>,
    },
    /// Nested record.
    Nested {
        /// Target type.
        target: TypeId,
    },
    /// List of items.
    List {
        /// Item type.
        item: ItemType,
        /// Item count rule.
        repetition: Repetition,
    },
}

/// A named member of a structural type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Collision-free, sanitized name.
    pub name: String,
    /// Shape.
    pub kind: PropertyKind,
    /// Target type was still being compiled when this property was created.
    pub recursive: bool,
    /// Declaration site.
    pub provenance: Provenance,
}

/// One step of a type's wire layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecStep {
    /// Scalar text property framed by `layout`.
    Field {
        /// Index into the type's properties.
        property: usize,
        /// Framing.
        layout: FieldLayout,
    },
    /// Nested record property.
    Nested {
        /// Index into the type's properties.
        property: usize,
    },
    /// List property.
    List {
        /// Index into the type's properties.
        property: usize,
    },
    /// Literal text, space padded to `width`.
    Constant {
        /// Literal.
        value: String,
        /// Width in characters.
        width: usize,
    },
    /// Run of `width` spaces.
    Padding {
        /// Width in characters.
        width: usize,
    },
    /// Reference whose target is not in the registry.
    Unresolved {
        /// Missing identifier.
        reference: String,
    },
    /// Reference already being included into this type.
    ReferenceCycle {
        /// Repeated identifier.
        reference: String,
    },
}

impl CodecStep {
    /// Property index for steps that read or write a property.
    #[must_use]
    pub const fn property(&self) -> Option<usize> {
        match self {
            Self::Field { property, .. } | Self::Nested { property } | Self::List { property } => {
                Some(*property)
            }
            _ => None,
        }
    }
}

/// A compiled record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralType {
    /// Sanitized type name.
    pub name: String,
    /// Properties in first-occurrence order.
    pub properties: Vec<Property>,
    /// Wire layout.
    pub steps: Vec<CodecStep>,
    /// Declaration site of the node the type was compiled from.
    pub provenance: Provenance,
}

impl StructuralType {
    /// Creates an empty type.
    pub fn new(name: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            steps: Vec::new(),
            provenance,
        }
    }

    /// Finds a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Fixed wire width, if the type has no lists or nested records.
    #[must_use]
    pub fn flat_width(&self) -> Option<usize> {
        self.steps.iter().try_fold(0, |acc, step| match step {
            CodecStep::Field { layout, .. } => Some(acc + layout.width),
            CodecStep::Constant { width, .. } | CodecStep::Padding { width } => Some(acc + width),
            CodecStep::Unresolved { .. } | CodecStep::ReferenceCycle { .. } => Some(acc),
            CodecStep::Nested { .. } | CodecStep::List { .. } => None,
        })
    }
}

/// Problem found while compiling. Compilation always completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The requested root identifier is not registered.
    RootNotFound {
        /// Requested identifier.
        id: String,
    },
    /// A reference target is not registered.
    UnresolvedReference {
        /// Missing identifier.
        reference: String,
        /// Type being compiled.
        in_type: String,
        /// Location of the reference.
        provenance: Provenance,
    },
    /// A reference re-enters an inclusion of the same type.
    ReferenceCycle {
        /// Repeated identifier.
        reference: String,
        /// Type being compiled.
        in_type: String,
        /// Location of the reference.
        provenance: Provenance,
    },
    /// A padding length is not a non-negative integer.
    InvalidPadding {
        /// Raw length text.
        value: String,
        /// Type being compiled.
        in_type: String,
        /// Location of the padding node.
        provenance: Provenance,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { id } => write!(f, "root '{id}' not found"),
            Self::UnresolvedReference {
                reference,
                in_type,
                provenance,
            } => write!(
                f,
                "{provenance}: unresolved reference '{reference}' in type '{in_type}'"
            ),
            Self::ReferenceCycle {
                reference,
                in_type,
                provenance,
            } => write!(
                f,
                "{provenance}: reference cycle through '{reference}' in type '{in_type}'"
            ),
            Self::InvalidPadding {
                value,
                in_type,
                provenance,
            } => write!(
                f,
                "{provenance}: invalid padding length '{value}' in type '{in_type}'"
            ),
        }
    }
}

/// Compiled types for one root.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: Vec<StructuralType>,
    index: HashMap<String, TypeId>,
    root: Option<TypeId>,
    diagnostics: Vec<Diagnostic>,
}

impl TypeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root type, if the root was found.
    #[must_use]
    pub const fn root(&self) -> Option<TypeId> {
        self.root
    }

    /// Root type definition, if the root was found.
    #[must_use]
    pub fn root_type(&self) -> Option<&StructuralType> {
        self.root.map(|id| self.get(id))
    }

    /// Returns the type for an id issued by this table.
    #[must_use]
    pub fn get(&self, id: TypeId) -> &StructuralType {
        &self.types[id.0]
    }

    /// Looks up a type id by sanitized name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.index.get(name).copied()
    }

    /// Looks up a type by sanitized name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&StructuralType> {
        self.find(name).map(|id| self.get(id))
    }

    /// All types in discovery order.
    #[must_use]
    pub fn types(&self) -> &[StructuralType] {
        &self.types
    }

    /// Iterates over ids and types in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &StructuralType)> {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }

    /// Number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type was compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Compile diagnostics in discovery order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn reserve(&mut self, ty: StructuralType) -> TypeId {
        let id = TypeId(self.types.len());
        self.index.insert(ty.name.clone(), id);
        self.types.push(ty);
        id
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut StructuralType {
        &mut self.types[id.0]
    }

    pub(crate) fn set_root(&mut self, id: TypeId) {
        self.root = Some(id);
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Per-type property name allocator.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    used: HashSet<String>,
}

impl NameScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `base`, or `base_2`, `base_3`, ... if already taken.
    pub fn unique(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}_{counter}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Sanitizes a schema name into an identifier-safe name.
///
/// `.`, `-` and `:` become `_`; a leading digit gets a `_` prefix; an empty
/// name becomes `Unknown`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    if name.is_empty() {
        return "Unknown".to_string();
    }
    let clean: String = name
        .chars()
        .map(|c| match c {
            '.' | '-' | ':' => '_',
            c => c,
        })
        .collect();
    if clean.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{clean}")
    } else {
        clean
    }
}

/// Converts a type name to snake_case (used for file and module names).
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Customer"), "Customer");
        assert_eq!(sanitize_name("cust.name-x:y"), "cust_name_x_y");
        assert_eq!(sanitize_name("9lives"), "_9lives");
        assert_eq!(sanitize_name(""), "Unknown");
    }

    #[test]
    fn test_name_scope_collisions() {
        let mut scope = NameScope::new();
        assert_eq!(scope.unique("Name"), "Name");
        assert_eq!(scope.unique("Name"), "Name_2");
        assert_eq!(scope.unique("Name"), "Name_3");
        assert_eq!(scope.unique("Other"), "Other");
    }

    #[test]
    fn test_name_scope_skips_taken_suffix() {
        let mut scope = NameScope::new();
        assert_eq!(scope.unique("Name_2"), "Name_2");
        assert_eq!(scope.unique("Name"), "Name");
        assert_eq!(scope.unique("Name"), "Name_3");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("CustomerInfo"), "customer_info");
        assert_eq!(to_snake_case("ABC"), "abc");
        assert_eq!(to_snake_case("Name_2"), "name_2");
        assert_eq!(to_snake_case("_9lives"), "_9lives");
        assert_eq!(to_snake_case("orderID"), "order_id");
    }

    #[test]
    fn test_repetition_parse() {
        assert_eq!(Repetition::parse(Some("*")), Repetition::Dynamic);
        assert_eq!(Repetition::parse(Some("3")), Repetition::Fixed(3));
        assert_eq!(Repetition::parse(Some("0")), Repetition::Fixed(0));
        assert_eq!(Repetition::parse(Some("-2")), Repetition::Fixed(1));
        assert_eq!(Repetition::parse(Some("many")), Repetition::Fixed(1));
        assert_eq!(Repetition::parse(None), Repetition::Fixed(1));
        assert_eq!(Repetition::Dynamic.to_string(), "*");
        assert_eq!(Repetition::Fixed(4).to_string(), "4");
    }

    #[test]
    fn test_type_table_reserve_and_find() {
        let mut table = TypeTable::new();
        assert!(table.is_empty());
        let id = table.reserve(StructuralType::new("A", Provenance::default()));
        table.set_root(id);

        assert_eq!(table.len(), 1);
        assert_eq!(table.find("A"), Some(id));
        assert_eq!(table.root_type().map(|t| t.name.as_str()), Some("A"));
        assert!(table.by_name("B").is_none());
        assert_eq!(id.index(), 0);
    }

    #[test]
    fn test_flat_width() {
        let mut ty = StructuralType::new("T", Provenance::default());
        ty.steps.push(CodecStep::Field {
            property: 0,
            layout: FieldLayout::text(5),
        });
        ty.steps.push(CodecStep::Constant {
            value: "H".into(),
            width: 2,
        });
        ty.steps.push(CodecStep::Padding { width: 3 });
        assert_eq!(ty.flat_width(), Some(10));

        ty.steps.push(CodecStep::Nested { property: 1 });
        assert_eq!(ty.flat_width(), None);
    }

    #[test]
    fn test_step_property_index() {
        assert_eq!(CodecStep::List { property: 3 }.property(), Some(3));
        assert_eq!(CodecStep::Padding { width: 1 }.property(), None);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::UnresolvedReference {
            reference: "X".into(),
            in_type: "Root".into(),
            provenance: Provenance::new("a.xml", 4),
        };
        assert_eq!(
            diag.to_string(),
            "a.xml line 4: unresolved reference 'X' in type 'Root'"
        );
        assert_eq!(
            Diagnostic::RootNotFound { id: "R".into() }.to_string(),
            "root 'R' not found"
        );
    }
}
