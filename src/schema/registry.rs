//! The frozen type table.

use std::ops::Index;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::element_type::{AttributeDecl, ChildCollection, ElementType};
use crate::base::{AttributeId, ChildCollectionId, TypeId};
use crate::config::SchemaConfig;
use crate::reference::{
    AnyReferenceId, AttributeReference, AttributeReferenceId, ElementReference,
    ElementReferenceCollection, ElementReferenceCollectionId, ElementReferenceId,
    IdsReferenceCollection, IdsReferenceCollectionId, Reference,
};

/// All element types of a schema, with their attributes, child collections
/// and bound references.
///
/// A registry is produced by [`SchemaBuilder::build`](super::SchemaBuilder::build)
/// and never changes afterwards, so it can be shared freely between model
/// instances and threads.
///
/// Handles (`TypeId`, `AttributeId`, reference ids, ...) index directly into
/// the registry that issued them; indexing with a handle from another
/// registry panics or returns an unrelated entry.
#[derive(Debug)]
pub struct TypeRegistry {
    pub(crate) config: SchemaConfig,
    pub(crate) types: Vec<ElementType>,
    pub(crate) type_names: FxHashMap<SmolStr, TypeId>,
    pub(crate) attributes: Vec<AttributeDecl>,
    pub(crate) child_collections: Vec<ChildCollection>,
    pub(crate) attribute_references: Vec<AttributeReference>,
    pub(crate) element_references: Vec<ElementReference>,
    pub(crate) collection_references: Vec<ElementReferenceCollection>,
    pub(crate) ids_references: Vec<IdsReferenceCollection>,
}

impl TypeRegistry {
    pub(crate) fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            types: Vec::new(),
            type_names: FxHashMap::default(),
            attributes: Vec::new(),
            child_collections: Vec::new(),
            attribute_references: Vec::new(),
            element_references: Vec::new(),
            collection_references: Vec::new(),
            ids_references: Vec::new(),
        }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    // ── Types ───────────────────────────────────────────────────────

    /// Look up a type by its schema name.
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    pub fn element_type(&self, id: TypeId) -> &ElementType {
        &self.types[id.index()]
    }

    pub fn type_name(&self, id: TypeId) -> &str {
        self.element_type(id).name()
    }

    /// Iterate over all types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &ElementType> {
        self.types.iter()
    }

    /// Iterate over `ty` and its base types, nearest first.
    pub fn base_chain(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(Some(ty), move |t| self.types[t.index()].base)
    }

    /// Returns true if `base` is `ty` itself or one of its ancestors.
    pub fn is_base_type_of(&self, base: TypeId, ty: TypeId) -> bool {
        self.base_chain(ty).any(|t| t == base)
    }

    /// `ty` and every type that extends it, directly or transitively.
    pub fn all_extending_types(&self, ty: TypeId) -> Vec<TypeId> {
        let mut result = vec![ty];
        let mut next = 0;
        while next < result.len() {
            let current = result[next];
            result.extend_from_slice(&self.types[current.index()].extending);
            next += 1;
        }
        result
    }

    // ── Attributes ──────────────────────────────────────────────────

    pub fn attribute(&self, id: AttributeId) -> &AttributeDecl {
        &self.attributes[id.index()]
    }

    /// Find an attribute by name on `ty`, falling back to its base types.
    pub fn find_attribute(&self, ty: TypeId, name: &str) -> Option<AttributeId> {
        self.base_chain(ty)
            .find_map(|t| self.types[t.index()].declared_attribute(name))
    }

    /// The identifier attribute of `ty`, declared on it or inherited.
    pub fn id_attribute(&self, ty: TypeId) -> Option<AttributeId> {
        self.base_chain(ty).find_map(|t| {
            self.types[t.index()]
                .declared_attributes()
                .find(|a| self.attributes[a.index()].is_id)
        })
    }

    /// Every attribute available on `ty`: its own first, then inherited ones.
    ///
    /// An attribute redeclared on a subtype hides the base declaration.
    pub fn all_attributes(&self, ty: TypeId) -> Vec<AttributeId> {
        let mut seen: Vec<&str> = Vec::new();
        let mut result = Vec::new();
        for t in self.base_chain(ty) {
            for attribute in self.types[t.index()].declared_attributes() {
                let name = self.attributes[attribute.index()].name.as_str();
                if !seen.contains(&name) {
                    seen.push(name);
                    result.push(attribute);
                }
            }
        }
        result
    }

    // ── Child collections ───────────────────────────────────────────

    pub fn child_collection(&self, id: ChildCollectionId) -> &ChildCollection {
        &self.child_collections[id.index()]
    }

    /// Child collections available on `ty` in document order: those of the
    /// root-most base type first, then each subtype's own.
    pub fn all_child_collections(&self, ty: TypeId) -> Vec<ChildCollectionId> {
        let mut chain: Vec<TypeId> = self.base_chain(ty).collect();
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|t| self.types[t.index()].child_collections.iter().copied())
            .collect()
    }

    // ── References ──────────────────────────────────────────────────

    /// Access any bound reference through the common contract.
    pub fn reference(&self, id: AnyReferenceId) -> &dyn Reference {
        match id {
            AnyReferenceId::Attribute(id) => &self[id],
            AnyReferenceId::Element(id) => &self[id],
            AnyReferenceId::ElementCollection(id) => &self[id],
            AnyReferenceId::Ids(id) => &self[id],
        }
    }

    /// Every bound reference, in declaration order per strategy.
    pub fn references(&self) -> impl Iterator<Item = &dyn Reference> {
        let attributes = self.attribute_references.iter().map(|r| r as &dyn Reference);
        let elements = self.element_references.iter().map(|r| r as &dyn Reference);
        let collections = self
            .collection_references
            .iter()
            .map(|r| r as &dyn Reference);
        let ids = self.ids_references.iter().map(|r| r as &dyn Reference);
        attributes.chain(elements).chain(collections).chain(ids)
    }

    /// References that may point at an element of type `ty`.
    pub fn references_to(&self, ty: TypeId) -> Vec<AnyReferenceId> {
        self.references()
            .filter(|r| self.is_base_type_of(r.target().target_type(), ty))
            .map(|r| r.id())
            .collect()
    }
}

impl Index<AttributeReferenceId> for TypeRegistry {
    type Output = AttributeReference;

    fn index(&self, id: AttributeReferenceId) -> &Self::Output {
        &self.attribute_references[id.index()]
    }
}

impl Index<ElementReferenceId> for TypeRegistry {
    type Output = ElementReference;

    fn index(&self, id: ElementReferenceId) -> &Self::Output {
        &self.element_references[id.index()]
    }
}

impl Index<ElementReferenceCollectionId> for TypeRegistry {
    type Output = ElementReferenceCollection;

    fn index(&self, id: ElementReferenceCollectionId) -> &Self::Output {
        &self.collection_references[id.index()]
    }
}

impl Index<IdsReferenceCollectionId> for TypeRegistry {
    type Output = IdsReferenceCollection;

    fn index(&self, id: IdsReferenceCollectionId) -> &Self::Output {
        &self.ids_references[id.index()]
    }
}
