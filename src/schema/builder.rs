//! Two-phase schema assembly.
//!
//! Phase one records element types, attributes, child collections and
//! unbound references by name. Phase two ([`SchemaBuilder::build`]) resolves
//! every name, binds each reference to its target type and identifier
//! attribute, and freezes the result into a [`TypeRegistry`].
//!
//! ```ignore
//! let mut schema = SchemaBuilder::new();
//! schema.element_type("baseElement").abstract_type().id_attribute("id");
//! schema.element_type("flowNode").extends("baseElement");
//!
//! let mut flow = schema.element_type("sequenceFlow").extends("baseElement");
//! let source_ref = flow.attribute("sourceRef").reference("flowNode").build();
//!
//! let registry = schema.build()?;
//! let reference = &registry[source_ref];
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use super::element_type::{AttributeDecl, ChildCollection, ElementType};
use super::registry::TypeRegistry;
use crate::base::{AttributeId, ChildCollectionId, TypeId};
use crate::config::SchemaConfig;
use crate::error::BuildError;
use crate::reference::builder::{
    AttributeReferenceBuilder, CollectionReferenceBuilder, ElementReferenceBuilder,
    IdsReferenceBuilder, PendingReference,
};
use crate::reference::{CollectionEncoding, IdentifierFormat};

#[derive(Debug)]
struct TypeDraft {
    name: SmolStr,
    base: Option<SmolStr>,
    is_abstract: bool,
    attributes: IndexMap<SmolStr, AttributeId>,
    child_collections: Vec<ChildCollectionId>,
}

#[derive(Debug)]
struct AttributeDraft {
    owner: TypeId,
    name: SmolStr,
    is_id: bool,
}

#[derive(Debug)]
struct ChildDraft {
    parent: TypeId,
    child: SmolStr,
    single: bool,
    immutable: bool,
}

/// Declares a schema and builds its [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    config: SchemaConfig,
    types: Vec<TypeDraft>,
    type_names: FxHashMap<SmolStr, TypeId>,
    attributes: Vec<AttributeDraft>,
    children: Vec<ChildDraft>,
    pending: Vec<PendingReference>,
    attribute_reference_count: usize,
    element_reference_count: usize,
    collection_reference_count: usize,
    ids_reference_count: usize,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchemaConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Declare an element type, or reopen it if the name is already declared.
    pub fn element_type(&mut self, name: &str) -> ElementTypeBuilder<'_> {
        let ty = self.declare_type(name);
        ElementTypeBuilder { schema: self, ty }
    }

    /// Number of references declared so far.
    pub fn reference_count(&self) -> usize {
        self.pending.len()
    }

    fn declare_type(&mut self, name: &str) -> TypeId {
        if let Some(&id) = self.type_names.get(name) {
            return id;
        }
        let id = TypeId::from_index(self.types.len());
        self.types.push(TypeDraft {
            name: name.into(),
            base: None,
            is_abstract: false,
            attributes: IndexMap::new(),
            child_collections: Vec::new(),
        });
        self.type_names.insert(name.into(), id);
        id
    }

    fn declare_attribute(&mut self, owner: TypeId, name: &str) -> AttributeId {
        if let Some(&id) = self.types[owner.index()].attributes.get(name) {
            return id;
        }
        let id = AttributeId::from_index(self.attributes.len());
        self.attributes.push(AttributeDraft {
            owner,
            name: name.into(),
            is_id: false,
        });
        self.types[owner.index()].attributes.insert(name.into(), id);
        id
    }

    fn declare_child(&mut self, parent: TypeId, child: &str) -> ChildCollectionId {
        let existing = self.types[parent.index()]
            .child_collections
            .iter()
            .copied()
            .find(|c| self.children[c.index()].child == child);
        if let Some(id) = existing {
            return id;
        }
        let id = ChildCollectionId::from_index(self.children.len());
        self.children.push(ChildDraft {
            parent,
            child: child.into(),
            single: false,
            immutable: false,
        });
        self.types[parent.index()].child_collections.push(id);
        id
    }

    pub(crate) fn set_single(&mut self, collection: ChildCollectionId) {
        self.children[collection.index()].single = true;
    }

    /// Record an unbound reference, returning its index among references of
    /// the same strategy.
    pub(crate) fn push_pending(&mut self, pending: PendingReference) -> usize {
        let counter = match pending {
            PendingReference::Attribute { .. } => &mut self.attribute_reference_count,
            PendingReference::Element { .. } => &mut self.element_reference_count,
            PendingReference::Collection { .. } => &mut self.collection_reference_count,
            PendingReference::Ids { .. } => &mut self.ids_reference_count,
        };
        let index = *counter;
        *counter += 1;
        self.pending.push(pending);
        index
    }

    // ── Phase two ───────────────────────────────────────────────────

    /// Resolve every declared name and bind all references.
    ///
    /// Fails on the first schema error; no partially built registry is
    /// returned.
    pub fn build(self) -> Result<Arc<TypeRegistry>, BuildError> {
        let SchemaBuilder {
            config,
            types,
            type_names,
            attributes,
            children,
            pending,
            ..
        } = self;

        let mut registry = TypeRegistry::new(config);

        for (index, draft) in types.iter().enumerate() {
            let base = match &draft.base {
                Some(base_name) => Some(type_names.get(base_name).copied().ok_or_else(|| {
                    BuildError::UnknownBaseType {
                        type_name: draft.name.clone(),
                        base_name: base_name.clone(),
                    }
                })?),
                None => None,
            };
            registry.types.push(ElementType {
                id: TypeId::from_index(index),
                name: draft.name.clone(),
                base,
                is_abstract: draft.is_abstract,
                attributes: draft.attributes.clone(),
                child_collections: draft.child_collections.clone(),
                extending: Vec::new(),
            });
        }
        registry.type_names = type_names;

        check_inheritance_cycles(&registry)?;

        for index in 0..registry.types.len() {
            if let Some(base) = registry.types[index].base {
                registry.types[base.index()]
                    .extending
                    .push(TypeId::from_index(index));
            }
        }

        registry.attributes = attributes
            .into_iter()
            .enumerate()
            .map(|(index, draft)| AttributeDecl {
                id: AttributeId::from_index(index),
                owner: draft.owner,
                name: draft.name,
                is_id: draft.is_id,
                incoming: Vec::new(),
                outgoing: Vec::new(),
            })
            .collect();

        for (index, draft) in children.into_iter().enumerate() {
            let child_type = registry
                .type_by_name(&draft.child)
                .ok_or_else(|| BuildError::UnknownType(draft.child.clone()))?;
            registry.child_collections.push(ChildCollection {
                id: ChildCollectionId::from_index(index),
                parent_type: draft.parent,
                child_type,
                single: draft.single,
                immutable: draft.immutable,
                outgoing: Vec::new(),
            });
        }

        for reference in pending {
            let id = reference.perform_model_build(&mut registry)?;
            debug!(
                "bound reference {:?} -> {}",
                id,
                registry.type_name(registry.reference(id).target().target_type())
            );
        }

        debug!(
            "schema built: {} types, {} attributes, {} child collections",
            registry.types.len(),
            registry.attributes.len(),
            registry.child_collections.len()
        );
        Ok(Arc::new(registry))
    }
}

fn check_inheritance_cycles(registry: &TypeRegistry) -> Result<(), BuildError> {
    let limit = registry.types.len();
    for ty in &registry.types {
        let mut current = ty.base;
        let mut steps = 0;
        while let Some(base) = current {
            steps += 1;
            if base == ty.id || steps > limit {
                return Err(BuildError::InheritanceCycle(ty.name.clone()));
            }
            current = registry.types[base.index()].base;
        }
    }
    Ok(())
}

// ============================================================================
// ELEMENT TYPE BUILDER
// ============================================================================

/// Declares the attributes and children of one element type.
pub struct ElementTypeBuilder<'a> {
    schema: &'a mut SchemaBuilder,
    ty: TypeId,
}

impl<'a> ElementTypeBuilder<'a> {
    pub fn id(&self) -> TypeId {
        self.ty
    }

    /// Set the base type by name; it may be declared later.
    pub fn extends(self, base: &str) -> Self {
        self.schema.types[self.ty.index()].base = Some(base.into());
        self
    }

    pub fn abstract_type(self) -> Self {
        self.schema.types[self.ty.index()].is_abstract = true;
        self
    }

    /// Declare (or reopen) an attribute of this type.
    pub fn attribute(&mut self, name: &str) -> AttributeBuilder<'_> {
        let attribute = self.schema.declare_attribute(self.ty, name);
        AttributeBuilder {
            schema: &mut *self.schema,
            owner: self.ty,
            attribute,
        }
    }

    /// Declare the identifier attribute of this type.
    pub fn id_attribute(mut self, name: &str) -> Self {
        self.attribute(name).id();
        self
    }

    /// Declare (or reopen) a collection of child elements of type `child_type`.
    pub fn child_element(&mut self, child_type: &str) -> ChildElementBuilder<'_> {
        let collection = self.schema.declare_child(self.ty, child_type);
        ChildElementBuilder {
            schema: &mut *self.schema,
            parent: self.ty,
            collection,
        }
    }
}

// ============================================================================
// ATTRIBUTE BUILDER
// ============================================================================

/// Declares one attribute, optionally as the source of a reference.
pub struct AttributeBuilder<'a> {
    schema: &'a mut SchemaBuilder,
    owner: TypeId,
    attribute: AttributeId,
}

impl<'a> AttributeBuilder<'a> {
    /// Mark the attribute as the identifier of its type.
    pub fn id(self) -> AttributeId {
        self.schema.attributes[self.attribute.index()].is_id = true;
        self.attribute
    }

    /// Finish without further configuration.
    pub fn declare(self) -> AttributeId {
        self.attribute
    }

    /// The attribute holds the identifier of an element of `target_type`.
    pub fn reference(self, target_type: &str) -> AttributeReferenceBuilder<'a> {
        AttributeReferenceBuilder::new(
            self.schema,
            self.owner,
            self.attribute,
            IdentifierFormat::Plain,
            target_type,
        )
    }

    /// Like [`reference`](Self::reference), but the stored value is a
    /// qualified name whose prefix is ignored when resolving.
    pub fn qname_reference(self, target_type: &str) -> AttributeReferenceBuilder<'a> {
        AttributeReferenceBuilder::new(
            self.schema,
            self.owner,
            self.attribute,
            IdentifierFormat::QName,
            target_type,
        )
    }
}

// ============================================================================
// CHILD ELEMENT BUILDER
// ============================================================================

/// Declares one child-element collection, optionally as a reference source.
pub struct ChildElementBuilder<'a> {
    schema: &'a mut SchemaBuilder,
    parent: TypeId,
    collection: ChildCollectionId,
}

impl<'a> ChildElementBuilder<'a> {
    /// At most one such child per parent.
    pub fn single(self) -> Self {
        self.schema.set_single(self.collection);
        self
    }

    /// Reference collections over these children reject mutation.
    pub fn immutable(self) -> Self {
        self.schema.children[self.collection.index()].immutable = true;
        self
    }

    /// Finish without declaring a reference.
    pub fn declare(self) -> ChildCollectionId {
        self.collection
    }

    /// The single child's text holds the identifier of a `target_type` element.
    pub fn element_reference(self, target_type: &str) -> ElementReferenceBuilder<'a> {
        self.schema.set_single(self.collection);
        ElementReferenceBuilder::new(self.schema, self.parent, self.collection, target_type)
    }

    /// Each child's text holds the identifier of a `target_type` element.
    pub fn element_reference_collection(
        self,
        target_type: &str,
    ) -> CollectionReferenceBuilder<'a> {
        CollectionReferenceBuilder::new(
            self.schema,
            self.parent,
            self.collection,
            CollectionEncoding::Text,
            target_type,
        )
    }

    /// Like [`element_reference_collection`](Self::element_reference_collection)
    /// with qualified-name text.
    pub fn qname_reference_collection(self, target_type: &str) -> CollectionReferenceBuilder<'a> {
        CollectionReferenceBuilder::new(
            self.schema,
            self.parent,
            self.collection,
            CollectionEncoding::QName,
            target_type,
        )
    }

    /// Each child holds `#id` in its href attribute.
    pub fn uri_reference_collection(self, target_type: &str) -> CollectionReferenceBuilder<'a> {
        let attribute = self.schema.config.uri_attribute.clone();
        CollectionReferenceBuilder::new(
            self.schema,
            self.parent,
            self.collection,
            CollectionEncoding::Uri { attribute },
            target_type,
        )
    }

    /// The single child's text is a separator-joined list of identifiers.
    pub fn id_list_reference(self, target_type: &str) -> IdsReferenceBuilder<'a> {
        self.schema.set_single(self.collection);
        IdsReferenceBuilder::new(self.schema, self.parent, self.collection, target_type)
    }
}
