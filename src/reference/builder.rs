//! Reference builders and build-time binding.
//!
//! Builders are obtained from [`AttributeBuilder`](crate::schema::AttributeBuilder)
//! and [`ChildElementBuilder`](crate::schema::ChildElementBuilder). Calling
//! `build()` records an unbound reference and hands back its id; the
//! reference itself exists once [`SchemaBuilder::build`] has bound it.

use smol_str::SmolStr;

use super::{
    AnyReferenceId, AttributeReference, AttributeReferenceId, CollectionEncoding,
    ElementReference, ElementReferenceCollection, ElementReferenceCollectionId,
    ElementReferenceId, IdentifierFormat, IdsReferenceCollection, IdsReferenceCollectionId,
    TargetBinding,
};
use crate::base::{AttributeId, ChildCollectionId, TypeId};
use crate::error::BuildError;
use crate::schema::{SchemaBuilder, TypeRegistry};

/// A reference declared in phase one, waiting for its target to be bound.
#[derive(Debug)]
pub(crate) enum PendingReference {
    Attribute {
        source_type: TypeId,
        attribute: AttributeId,
        format: IdentifierFormat,
        target: SmolStr,
    },
    Element {
        source_type: TypeId,
        collection: ChildCollectionId,
        target: SmolStr,
    },
    Collection {
        source_type: TypeId,
        collection: ChildCollectionId,
        encoding: CollectionEncoding,
        target: SmolStr,
    },
    Ids {
        source_type: TypeId,
        collection: ChildCollectionId,
        separator: char,
        target: SmolStr,
    },
}

impl PendingReference {
    /// Bind the target type and its identifier attribute, store the bound
    /// reference in `registry` and record it as outgoing on the source
    /// accessor and incoming on the target's identifier attribute.
    pub(crate) fn perform_model_build(
        self,
        registry: &mut TypeRegistry,
    ) -> Result<AnyReferenceId, BuildError> {
        let id = match self {
            Self::Attribute {
                source_type,
                attribute,
                format,
                target,
            } => {
                let target = bind_target(registry, &target)?;
                let id = AttributeReferenceId::from_index(registry.attribute_references.len());
                let attribute_name = registry.attribute(attribute).name.clone();
                registry.attribute_references.push(AttributeReference {
                    id,
                    source_type,
                    source_attribute: attribute,
                    attribute_name,
                    format,
                    target,
                });
                registry.attributes[attribute.index()]
                    .outgoing
                    .push(id.into());
                AnyReferenceId::from(id)
            }
            Self::Element {
                source_type,
                collection,
                target,
            } => {
                let target = bind_target(registry, &target)?;
                let id = ElementReferenceId::from_index(registry.element_references.len());
                let child_type = registry.child_collection(collection).child_type;
                registry.element_references.push(ElementReference {
                    id,
                    source_type,
                    collection,
                    child_type,
                    target,
                });
                registry.child_collections[collection.index()]
                    .outgoing
                    .push(id.into());
                AnyReferenceId::from(id)
            }
            Self::Collection {
                source_type,
                collection,
                encoding,
                target,
            } => {
                let target = bind_target(registry, &target)?;
                let id =
                    ElementReferenceCollectionId::from_index(registry.collection_references.len());
                let declared = registry.child_collection(collection);
                let (child_type, immutable) = (declared.child_type, declared.immutable);
                registry.collection_references.push(ElementReferenceCollection {
                    id,
                    source_type,
                    collection,
                    child_type,
                    encoding,
                    immutable,
                    target,
                });
                registry.child_collections[collection.index()]
                    .outgoing
                    .push(id.into());
                AnyReferenceId::from(id)
            }
            Self::Ids {
                source_type,
                collection,
                separator,
                target,
            } => {
                let target = bind_target(registry, &target)?;
                let id = IdsReferenceCollectionId::from_index(registry.ids_references.len());
                let declared = registry.child_collection(collection);
                let (child_type, immutable) = (declared.child_type, declared.immutable);
                registry.ids_references.push(IdsReferenceCollection {
                    id,
                    source_type,
                    collection,
                    child_type,
                    separator,
                    immutable,
                    target,
                });
                registry.child_collections[collection.index()]
                    .outgoing
                    .push(id.into());
                AnyReferenceId::from(id)
            }
        };

        let id_attribute = registry.reference(id).target().id_attribute;
        registry.attributes[id_attribute.index()].incoming.push(id);
        Ok(id)
    }
}

/// Resolve `target` and find its identifier attribute along the base chain.
fn bind_target(registry: &TypeRegistry, target: &str) -> Result<TargetBinding, BuildError> {
    let target_type = registry
        .type_by_name(target)
        .ok_or_else(|| BuildError::UnknownType(target.into()))?;
    let id_attribute =
        registry
            .id_attribute(target_type)
            .ok_or_else(|| BuildError::MissingIdAttribute {
                type_name: target.into(),
            })?;
    Ok(TargetBinding {
        target_type,
        id_attribute,
        id_attribute_name: registry.attribute(id_attribute).name.clone(),
    })
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Declares an attribute reference; see
/// [`AttributeBuilder::reference`](crate::schema::AttributeBuilder::reference).
pub struct AttributeReferenceBuilder<'a> {
    schema: &'a mut SchemaBuilder,
    source_type: TypeId,
    attribute: AttributeId,
    format: IdentifierFormat,
    target: SmolStr,
}

impl<'a> AttributeReferenceBuilder<'a> {
    pub(crate) fn new(
        schema: &'a mut SchemaBuilder,
        source_type: TypeId,
        attribute: AttributeId,
        format: IdentifierFormat,
        target: &str,
    ) -> Self {
        Self {
            schema,
            source_type,
            attribute,
            format,
            target: target.into(),
        }
    }

    pub fn build(self) -> AttributeReferenceId {
        let index = self.schema.push_pending(PendingReference::Attribute {
            source_type: self.source_type,
            attribute: self.attribute,
            format: self.format,
            target: self.target,
        });
        AttributeReferenceId::from_index(index)
    }
}

/// Declares a single-child element reference.
pub struct ElementReferenceBuilder<'a> {
    schema: &'a mut SchemaBuilder,
    source_type: TypeId,
    collection: ChildCollectionId,
    target: SmolStr,
}

impl<'a> ElementReferenceBuilder<'a> {
    pub(crate) fn new(
        schema: &'a mut SchemaBuilder,
        source_type: TypeId,
        collection: ChildCollectionId,
        target: &str,
    ) -> Self {
        Self {
            schema,
            source_type,
            collection,
            target: target.into(),
        }
    }

    pub fn build(self) -> ElementReferenceId {
        let index = self.schema.push_pending(PendingReference::Element {
            source_type: self.source_type,
            collection: self.collection,
            target: self.target,
        });
        ElementReferenceId::from_index(index)
    }
}

/// Declares an element reference collection.
pub struct CollectionReferenceBuilder<'a> {
    schema: &'a mut SchemaBuilder,
    source_type: TypeId,
    collection: ChildCollectionId,
    encoding: CollectionEncoding,
    target: SmolStr,
}

impl<'a> CollectionReferenceBuilder<'a> {
    pub(crate) fn new(
        schema: &'a mut SchemaBuilder,
        source_type: TypeId,
        collection: ChildCollectionId,
        encoding: CollectionEncoding,
        target: &str,
    ) -> Self {
        Self {
            schema,
            source_type,
            collection,
            encoding,
            target: target.into(),
        }
    }

    /// Store the `#id` of each member in `attribute` instead of the schema
    /// default. Turns a text collection into a URI collection.
    pub fn href_attribute(mut self, attribute: &str) -> Self {
        self.encoding = CollectionEncoding::Uri {
            attribute: attribute.into(),
        };
        self
    }

    pub fn build(self) -> ElementReferenceCollectionId {
        let index = self.schema.push_pending(PendingReference::Collection {
            source_type: self.source_type,
            collection: self.collection,
            encoding: self.encoding,
            target: self.target,
        });
        ElementReferenceCollectionId::from_index(index)
    }
}

/// Declares an identifier-list reference collection.
pub struct IdsReferenceBuilder<'a> {
    schema: &'a mut SchemaBuilder,
    source_type: TypeId,
    collection: ChildCollectionId,
    separator: char,
    target: SmolStr,
}

impl<'a> IdsReferenceBuilder<'a> {
    pub(crate) fn new(
        schema: &'a mut SchemaBuilder,
        source_type: TypeId,
        collection: ChildCollectionId,
        target: &str,
    ) -> Self {
        let separator = schema.config().id_list_separator;
        Self {
            schema,
            source_type,
            collection,
            separator,
            target: target.into(),
        }
    }

    /// Join identifiers with `separator` instead of the schema default.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn build(self) -> IdsReferenceCollectionId {
        let index = self.schema.push_pending(PendingReference::Ids {
            source_type: self.source_type,
            collection: self.collection,
            separator: self.separator,
            target: self.target,
        });
        IdsReferenceCollectionId::from_index(index)
    }
}
