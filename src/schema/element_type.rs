//! Element type, attribute and child-collection descriptors.

use crate::base::{AttributeId, ChildCollectionId, TypeId};
use crate::reference::AnyReferenceId;
use indexmap::IndexMap;
use smol_str::SmolStr;

// ============================================================================
// ELEMENT TYPE
// ============================================================================

/// Schema-level descriptor of an element kind.
#[derive(Clone, Debug)]
pub struct ElementType {
    pub(crate) id: TypeId,
    pub(crate) name: SmolStr,
    pub(crate) base: Option<TypeId>,
    pub(crate) is_abstract: bool,
    /// Attributes declared on this type itself (not inherited), in declaration order.
    pub(crate) attributes: IndexMap<SmolStr, AttributeId>,
    /// Child collections declared on this type itself, in document order.
    pub(crate) child_collections: Vec<ChildCollectionId>,
    /// Types whose base type is this one.
    pub(crate) extending: Vec<TypeId>,
}

impl ElementType {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The direct base type, if any.
    pub fn base_type(&self) -> Option<TypeId> {
        self.base
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Attributes declared directly on this type.
    pub fn declared_attributes(&self) -> impl Iterator<Item = AttributeId> + '_ {
        self.attributes.values().copied()
    }

    /// Look up an attribute declared directly on this type.
    ///
    /// Use [`TypeRegistry::find_attribute`](super::TypeRegistry::find_attribute)
    /// for lookup that falls back to base types.
    pub fn declared_attribute(&self, name: &str) -> Option<AttributeId> {
        self.attributes.get(name).copied()
    }

    /// Child collections declared directly on this type.
    pub fn child_collections(&self) -> &[ChildCollectionId] {
        &self.child_collections
    }

    /// Types that directly extend this one.
    pub fn extending_types(&self) -> &[TypeId] {
        &self.extending
    }
}

// ============================================================================
// ATTRIBUTE
// ============================================================================

/// An attribute declared on an element type.
///
/// After the schema is built, the attribute records the references that
/// read it (`outgoing`, for attributes that store identifiers of other
/// elements) and the references that point at it (`incoming`, for
/// identifier attributes).
#[derive(Clone, Debug)]
pub struct AttributeDecl {
    pub(crate) id: AttributeId,
    pub(crate) owner: TypeId,
    pub(crate) name: SmolStr,
    pub(crate) is_id: bool,
    pub(crate) incoming: Vec<AnyReferenceId>,
    pub(crate) outgoing: Vec<AnyReferenceId>,
}

impl AttributeDecl {
    pub fn id(&self) -> AttributeId {
        self.id
    }

    /// The type that declares this attribute.
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this attribute holds the element's identifier.
    pub fn is_id_attribute(&self) -> bool {
        self.is_id
    }

    /// References whose targets are identified by this attribute.
    pub fn incoming_references(&self) -> &[AnyReferenceId] {
        &self.incoming
    }

    /// References that store their identifier in this attribute.
    pub fn outgoing_references(&self) -> &[AnyReferenceId] {
        &self.outgoing
    }
}

// ============================================================================
// CHILD COLLECTION
// ============================================================================

/// A declared collection of child elements of one kind.
#[derive(Clone, Debug)]
pub struct ChildCollection {
    pub(crate) id: ChildCollectionId,
    pub(crate) parent_type: TypeId,
    pub(crate) child_type: TypeId,
    pub(crate) single: bool,
    pub(crate) immutable: bool,
    pub(crate) outgoing: Vec<AnyReferenceId>,
}

impl ChildCollection {
    pub fn id(&self) -> ChildCollectionId {
        self.id
    }

    pub fn parent_type(&self) -> TypeId {
        self.parent_type
    }

    pub fn child_type(&self) -> TypeId {
        self.child_type
    }

    /// At most one child of this kind exists per parent.
    pub fn is_single(&self) -> bool {
        self.single
    }

    /// Reference collections over this child collection reject mutation.
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// References that store identifiers in these children.
    pub fn outgoing_references(&self) -> &[AnyReferenceId] {
        &self.outgoing
    }
}
