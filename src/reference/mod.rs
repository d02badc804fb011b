//! References between elements.
//!
//! A reference is a typed, directed link from a *source accessor* (an
//! attribute or a child-element collection of the source type) to elements
//! of a *target type*, addressed by the target's identifier attribute.
//!
//! ```text
//! Reference                      (common contract, propagation hooks)
//! ├── ScalarReference            (at most one target per source)
//! │   ├── AttributeReference       identifier in an attribute (plain / QName)
//! │   └── ElementReference         identifier in a single child's text
//! └── ReferenceCollection        (zero or more targets, live views)
//!     ├── ElementReferenceCollection  one child per target (text / QName / URI)
//!     └── IdsReferenceCollection      one child holding an identifier list
//! ```
//!
//! References are created unbound by the builders of
//! [`SchemaBuilder`](crate::schema::SchemaBuilder) and bound to their target
//! type once, when the schema is built. They hold no per-model state: every
//! operation takes the [`ModelInstance`] it acts on.

mod attribute;
pub(crate) mod builder;
mod codec;
mod collection;
mod element;
mod ids;
mod view;

use std::fmt;

use indexmap::IndexSet;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::{AttributeId, ChildCollectionId, NodeId, TypeId};
use crate::error::ModelError;
use crate::model::ModelInstance;

pub use attribute::AttributeReference;
pub use builder::{
    AttributeReferenceBuilder, CollectionReferenceBuilder, ElementReferenceBuilder,
    IdsReferenceBuilder,
};
pub use codec::{CollectionEncoding, IdentifierFormat};
pub use collection::ElementReferenceCollection;
pub use element::ElementReference;
pub use ids::IdsReferenceCollection;
pub use view::{TargetView, TargetViewMut};

crate::base::index_handle!(
    /// An attribute-valued reference of a schema.
    AttributeReferenceId,
    "attribute-ref"
);

crate::base::index_handle!(
    /// A child-element-valued reference of a schema.
    ElementReferenceId,
    "element-ref"
);

crate::base::index_handle!(
    /// A child-element reference collection of a schema.
    ElementReferenceCollectionId,
    "collection-ref"
);

crate::base::index_handle!(
    /// An identifier-list reference collection of a schema.
    IdsReferenceCollectionId,
    "ids-ref"
);

/// Any bound reference, whatever its strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnyReferenceId {
    Attribute(AttributeReferenceId),
    Element(ElementReferenceId),
    ElementCollection(ElementReferenceCollectionId),
    Ids(IdsReferenceCollectionId),
}

impl fmt::Display for AnyReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(id) => write!(f, "{id}"),
            Self::Element(id) => write!(f, "{id}"),
            Self::ElementCollection(id) => write!(f, "{id}"),
            Self::Ids(id) => write!(f, "{id}"),
        }
    }
}

impl From<AttributeReferenceId> for AnyReferenceId {
    fn from(id: AttributeReferenceId) -> Self {
        Self::Attribute(id)
    }
}

impl From<ElementReferenceId> for AnyReferenceId {
    fn from(id: ElementReferenceId) -> Self {
        Self::Element(id)
    }
}

impl From<ElementReferenceCollectionId> for AnyReferenceId {
    fn from(id: ElementReferenceCollectionId) -> Self {
        Self::ElementCollection(id)
    }
}

impl From<IdsReferenceCollectionId> for AnyReferenceId {
    fn from(id: IdsReferenceCollectionId) -> Self {
        Self::Ids(id)
    }
}

/// The target side of a bound reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetBinding {
    pub(crate) target_type: TypeId,
    pub(crate) id_attribute: AttributeId,
    pub(crate) id_attribute_name: SmolStr,
}

impl TargetBinding {
    /// The type referenced elements must be instances of.
    pub fn target_type(&self) -> TypeId {
        self.target_type
    }

    /// The identifier attribute of the target type, possibly inherited.
    pub fn id_attribute(&self) -> AttributeId {
        self.id_attribute
    }

    pub fn id_attribute_name(&self) -> &str {
        &self.id_attribute_name
    }
}

// ============================================================================
// REFERENCE CONTRACT
// ============================================================================

/// Behaviour shared by every reference strategy.
///
/// A *carrier* is an element whose content stores identifiers for this
/// reference: the source element itself for attribute references, the parent
/// of the source children for element-based ones.
pub trait Reference: fmt::Debug + Send + Sync {
    fn id(&self) -> AnyReferenceId;

    /// The type whose instances carry this reference.
    fn source_type(&self) -> TypeId;

    fn target(&self) -> &TargetBinding;

    /// Identifiers currently stored in `carrier`, decoded, in document order.
    fn stored_identifiers(&self, model: &ModelInstance, carrier: NodeId) -> Vec<String>;

    /// Rewrite every stored `old` identifier of `carrier` to `new`.
    ///
    /// Returns whether anything changed.
    fn update_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        old: &str,
        new: &str,
    ) -> Result<bool, ModelError>;

    /// Drop `identifier` from `carrier`.
    ///
    /// Element collections drop every carrier child storing it; identifier
    /// lists drop its first entry only.
    ///
    /// Returns whether anything was removed.
    fn remove_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        identifier: &str,
    ) -> Result<bool, ModelError>;

    /// Elements that may reference `target` through this reference.
    ///
    /// These are all attached instances of the source type. The set is empty
    /// when `target` is not an instance of the target type.
    fn find_referencing_elements(&self, model: &ModelInstance, target: NodeId) -> IndexSet<NodeId> {
        if !model.is_instance_of(target, self.target().target_type()) {
            return IndexSet::new();
        }
        model.elements_of_type(self.source_type()).into_iter().collect()
    }

    /// Called after the identifier of `target` changed from `old` to `new`.
    ///
    /// Returns the number of carriers that were updated.
    fn on_target_renamed(
        &self,
        model: &mut ModelInstance,
        target: NodeId,
        old: &str,
        new: &str,
    ) -> Result<usize, ModelError> {
        let mut updated = 0;
        for carrier in self.find_referencing_elements(model, target) {
            if !model.contains(carrier) {
                continue;
            }
            if self.update_reference(model, carrier, old, new)? {
                trace!("{}: {} now references {}", self.id(), carrier, new);
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Called before `target`, identified by `identifier`, leaves the model.
    ///
    /// Returns the number of carriers that lost a reference.
    fn on_target_removed(
        &self,
        model: &mut ModelInstance,
        target: NodeId,
        identifier: &str,
    ) -> Result<usize, ModelError> {
        let mut removed = 0;
        for carrier in self.find_referencing_elements(model, target) {
            if !model.contains(carrier) {
                continue;
            }
            if self.remove_reference(model, carrier, identifier)? {
                trace!("{}: {} no longer references {}", self.id(), carrier, identifier);
                removed += 1;
            }
        }
        Ok(removed)
    }
}

// ============================================================================
// SCALAR REFERENCES
// ============================================================================

/// A reference with at most one target per source element.
pub trait ScalarReference: Reference {
    /// The identifier stored in `source`, if any.
    fn resolve_identifier(
        &self,
        model: &ModelInstance,
        source: NodeId,
    ) -> Result<Option<String>, ModelError>;

    /// Store `identifier` in `source`, replacing any previous value.
    fn write_identifier(
        &self,
        model: &mut ModelInstance,
        source: NodeId,
        identifier: &str,
    ) -> Result<(), ModelError>;

    /// Remove the reference from `source`.
    fn clear_target(&self, model: &mut ModelInstance, source: NodeId) -> Result<(), ModelError>;

    /// The element referenced by `source`.
    ///
    /// `Ok(None)` when no identifier is stored. A stored identifier that is
    /// missing from the model, or names an element of the wrong type, is an
    /// error.
    fn resolve_target(
        &self,
        model: &ModelInstance,
        source: NodeId,
    ) -> Result<Option<NodeId>, ModelError> {
        match self.resolve_identifier(model, source)? {
            Some(identifier) => resolve_target_element(model, self.target(), &identifier).map(Some),
            None => Ok(None),
        }
    }

    /// Point `source` at `target`.
    ///
    /// `target` must be attached to the model and reachable through its own
    /// identifier; otherwise [`ModelError::NotConnected`] is returned and
    /// `source` is left unchanged.
    fn set_target(
        &self,
        model: &mut ModelInstance,
        source: NodeId,
        target: NodeId,
    ) -> Result<(), ModelError> {
        model.expect_instance(source, self.source_type())?;
        let identifier = connected_identifier(model, self.target(), target)?;
        self.write_identifier(model, source, &identifier)
    }
}

// ============================================================================
// REFERENCE COLLECTIONS
// ============================================================================

/// A reference with zero or more targets per parent element.
///
/// Collections are read and edited through [`TargetView`] and
/// [`TargetViewMut`], which translate between target elements and the
/// children that store their identifiers.
pub trait ReferenceCollection: Reference {
    /// The child collection holding the stored identifiers.
    fn child_collection(&self) -> ChildCollectionId;

    /// Whether views over this collection reject mutation.
    fn is_immutable(&self) -> bool;

    /// Children of `parent` that store identifiers for this collection.
    fn carriers(&self, model: &ModelInstance, parent: NodeId) -> Vec<NodeId> {
        model.child_elements(parent, self.child_collection())
    }

    /// Stored identifiers of `parent` in document order.
    fn resolve_identifiers(
        &self,
        model: &ModelInstance,
        parent: NodeId,
    ) -> Result<Vec<String>, ModelError> {
        model.expect_instance(parent, self.source_type())?;
        Ok(self.stored_identifiers(model, parent))
    }

    /// Resolve every stored identifier, failing on the first dangling one.
    fn resolve_targets(
        &self,
        model: &ModelInstance,
        parent: NodeId,
    ) -> Result<Vec<NodeId>, ModelError> {
        self.resolve_identifiers(model, parent)?
            .iter()
            .map(|identifier| resolve_target_element(model, self.target(), identifier))
            .collect()
    }

    /// Store one more identifier below `parent`.
    ///
    /// This and the other `perform_*` methods are the unchecked primitives
    /// behind [`TargetViewMut`]: they ignore [`is_immutable`] and do not
    /// check that the identifier is connected.
    ///
    /// [`is_immutable`]: ReferenceCollection::is_immutable
    fn perform_add(
        &self,
        model: &mut ModelInstance,
        parent: NodeId,
        identifier: &str,
    ) -> Result<(), ModelError>;

    /// Remove `identifier` below `parent`, as [`Reference::remove_reference`].
    fn perform_remove(
        &self,
        model: &mut ModelInstance,
        parent: NodeId,
        identifier: &str,
    ) -> Result<bool, ModelError> {
        self.remove_reference(model, parent, identifier)
    }

    /// Remove every stored identifier below `parent`.
    fn perform_clear(&self, model: &mut ModelInstance, parent: NodeId) -> Result<(), ModelError> {
        for carrier in self.carriers(model, parent) {
            model.remove_element(carrier)?;
        }
        Ok(())
    }

    /// A read-only view of the targets referenced from `parent`.
    fn view<'a>(
        &'a self,
        model: &'a ModelInstance,
        parent: NodeId,
    ) -> Result<TargetView<'a>, ModelError>
    where
        Self: Sized,
    {
        TargetView::new(model, self, parent)
    }

    /// A mutable view of the targets referenced from `parent`.
    fn view_mut<'a>(
        &'a self,
        model: &'a mut ModelInstance,
        parent: NodeId,
    ) -> Result<TargetViewMut<'a>, ModelError>
    where
        Self: Sized,
    {
        TargetViewMut::new(model, self, parent)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Look up `identifier` and check the element against `binding`.
pub(crate) fn resolve_target_element(
    model: &ModelInstance,
    binding: &TargetBinding,
    identifier: &str,
) -> Result<NodeId, ModelError> {
    let element = model
        .element_by_id(identifier)
        .ok_or_else(|| ModelError::not_found(identifier))?;
    let found = model.element_type(element)?;
    if !model.schema().is_base_type_of(binding.target_type, found) {
        return Err(ModelError::TypeMismatch {
            identifier: identifier.to_owned(),
            expected: SmolStr::new(model.schema().type_name(binding.target_type)),
            found: SmolStr::new(model.schema().type_name(found)),
        });
    }
    Ok(element)
}

/// The identifier of `target`, provided the model resolves it back to
/// `target` itself.
pub(crate) fn connected_identifier(
    model: &ModelInstance,
    binding: &TargetBinding,
    target: NodeId,
) -> Result<String, ModelError> {
    let found = model.element_type(target)?;
    let identifier = model.attribute(target, &binding.id_attribute_name);
    if !model.schema().is_base_type_of(binding.target_type, found) {
        return Err(ModelError::TypeMismatch {
            identifier: identifier.unwrap_or_default().to_owned(),
            expected: SmolStr::new(model.schema().type_name(binding.target_type)),
            found: SmolStr::new(model.schema().type_name(found)),
        });
    }
    match identifier {
        Some(identifier) if model.element_by_id(identifier) == Some(target) => {
            Ok(identifier.to_owned())
        }
        _ => Err(ModelError::NotConnected { element: target }),
    }
}
