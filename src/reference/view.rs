//! Live views over reference collections.
//!
//! A view pairs a [`ReferenceCollection`] with one parent element. Nothing is
//! cached: every read goes to the current children of the parent, and every
//! write turns into child insertions, removals or text edits.

use super::{ReferenceCollection, connected_identifier, resolve_target_element};
use crate::base::NodeId;
use crate::error::ModelError;
use crate::model::ModelInstance;

/// Read-only view of the targets referenced from one parent element.
#[derive(Clone, Copy)]
pub struct TargetView<'a> {
    model: &'a ModelInstance,
    collection: &'a dyn ReferenceCollection,
    parent: NodeId,
}

impl<'a> TargetView<'a> {
    /// Fails if `parent` is not an instance of the collection's source type.
    pub fn new(
        model: &'a ModelInstance,
        collection: &'a dyn ReferenceCollection,
        parent: NodeId,
    ) -> Result<Self, ModelError> {
        model.expect_instance(parent, collection.source_type())?;
        Ok(Self {
            model,
            collection,
            parent,
        })
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Stored identifiers in document order, unresolved.
    pub fn identifiers(&self) -> Vec<String> {
        self.collection.stored_identifiers(self.model, self.parent)
    }

    /// Number of stored identifiers.
    pub fn len(&self) -> usize {
        self.identifiers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve members lazily, in document order.
    pub fn iter(&self) -> impl Iterator<Item = Result<NodeId, ModelError>> + use<'a> {
        let model = self.model;
        let collection = self.collection;
        self.identifiers()
            .into_iter()
            .map(move |identifier| resolve_target_element(model, collection.target(), &identifier))
    }

    /// Resolve every member, failing on the first dangling identifier.
    pub fn to_vec(&self) -> Result<Vec<NodeId>, ModelError> {
        self.iter().collect()
    }

    /// Whether `target` is among the resolved members.
    pub fn contains(&self, target: NodeId) -> Result<bool, ModelError> {
        for member in self.iter() {
            if member? == target {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl std::fmt::Debug for TargetView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetView")
            .field("reference", &self.collection.id())
            .field("parent", &self.parent)
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

/// Mutable view of the targets referenced from one parent element.
///
/// Every write first checks that the collection is mutable and that all
/// targets are connected to the model. A failing call leaves the tree
/// unchanged.
pub struct TargetViewMut<'a> {
    model: &'a mut ModelInstance,
    collection: &'a dyn ReferenceCollection,
    parent: NodeId,
}

impl<'a> TargetViewMut<'a> {
    /// Fails if `parent` is not an instance of the collection's source type.
    pub fn new(
        model: &'a mut ModelInstance,
        collection: &'a dyn ReferenceCollection,
        parent: NodeId,
    ) -> Result<Self, ModelError> {
        model.expect_instance(parent, collection.source_type())?;
        Ok(Self {
            model,
            collection,
            parent,
        })
    }

    /// Borrow as a read-only view.
    pub fn as_view(&self) -> TargetView<'_> {
        TargetView {
            model: &*self.model,
            collection: self.collection,
            parent: self.parent,
        }
    }

    pub fn model(&self) -> &ModelInstance {
        &*self.model
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.as_view().identifiers()
    }

    pub fn len(&self) -> usize {
        self.as_view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_view().is_empty()
    }

    pub fn to_vec(&self) -> Result<Vec<NodeId>, ModelError> {
        self.as_view().to_vec()
    }

    pub fn contains(&self, target: NodeId) -> Result<bool, ModelError> {
        self.as_view().contains(target)
    }

    fn ensure_mutable(&self, operation: &'static str) -> Result<(), ModelError> {
        if self.collection.is_immutable() {
            Err(ModelError::immutable(operation))
        } else {
            Ok(())
        }
    }

    /// Reference `target` unless it is already a member.
    ///
    /// Returns whether the collection changed.
    pub fn add(&mut self, target: NodeId) -> Result<bool, ModelError> {
        self.ensure_mutable("add")?;
        let identifier = connected_identifier(self.model, self.collection.target(), target)?;
        self.add_identifier(identifier)
    }

    /// Reference every target that is not already a member.
    ///
    /// All targets are checked before the first one is added.
    pub fn add_all(&mut self, targets: impl IntoIterator<Item = NodeId>) -> Result<bool, ModelError> {
        self.ensure_mutable("add_all")?;
        let identifiers = targets
            .into_iter()
            .map(|target| connected_identifier(self.model, self.collection.target(), target))
            .collect::<Result<Vec<_>, _>>()?;
        let mut changed = false;
        for identifier in identifiers {
            changed |= self.add_identifier(identifier)?;
        }
        Ok(changed)
    }

    fn add_identifier(&mut self, identifier: String) -> Result<bool, ModelError> {
        if self.identifiers().contains(&identifier) {
            return Ok(false);
        }
        self.collection
            .perform_add(self.model, self.parent, &identifier)?;
        Ok(true)
    }

    /// Drop `target` from the collection.
    ///
    /// Returns whether the collection changed.
    pub fn remove(&mut self, target: NodeId) -> Result<bool, ModelError> {
        self.ensure_mutable("remove")?;
        match self.stored_identifier_of(target)? {
            Some(identifier) => self.remove_identifier(&identifier),
            None => Ok(false),
        }
    }

    /// Drop the members resolving to any of `targets`.
    ///
    /// All targets are checked before the first one is removed.
    pub fn remove_all(
        &mut self,
        targets: impl IntoIterator<Item = NodeId>,
    ) -> Result<bool, ModelError> {
        self.ensure_mutable("remove_all")?;
        let identifiers = targets
            .into_iter()
            .map(|target| self.stored_identifier_of(target))
            .collect::<Result<Vec<_>, _>>()?;
        let mut changed = false;
        for identifier in identifiers.into_iter().flatten() {
            changed |= self.remove_identifier(&identifier)?;
        }
        Ok(changed)
    }

    /// The identifier `target` would be stored under, if it has one.
    fn stored_identifier_of(&self, target: NodeId) -> Result<Option<String>, ModelError> {
        self.model.element_type(target)?;
        let name = self.collection.target().id_attribute_name();
        Ok(self.model.attribute(target, name).map(str::to_owned))
    }

    fn remove_identifier(&mut self, identifier: &str) -> Result<bool, ModelError> {
        self.collection
            .perform_remove(self.model, self.parent, identifier)
    }

    /// Remove every member.
    pub fn clear(&mut self) -> Result<(), ModelError> {
        self.ensure_mutable("clear")?;
        self.collection.perform_clear(self.model, self.parent)
    }

    /// Always fails: a retained set of targets does not determine which
    /// stored children to keep.
    pub fn retain_all(
        &mut self,
        _targets: impl IntoIterator<Item = NodeId>,
    ) -> Result<bool, ModelError> {
        Err(ModelError::Unsupported {
            operation: "retain_all",
            reason: "retained targets cannot be mapped back to stored references",
        })
    }
}

impl std::fmt::Debug for TargetViewMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.as_view(), f)
    }
}
