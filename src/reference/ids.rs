//! References stored as an identifier list in one child element.

use super::{
    AnyReferenceId, IdsReferenceCollectionId, Reference, ReferenceCollection, TargetBinding,
};
use crate::base::{ChildCollectionId, NodeId, TypeId};
use crate::error::ModelError;
use crate::model::ModelInstance;

/// A single child of the parent holds every identifier, joined by a
/// separator character: `<dataStoreRefs>Store_1 Store_2</dataStoreRefs>`.
///
/// Removing an identifier drops its first entry only. Removing the only
/// entry removes the child.
#[derive(Clone, Debug)]
pub struct IdsReferenceCollection {
    pub(crate) id: IdsReferenceCollectionId,
    pub(crate) source_type: TypeId,
    pub(crate) collection: ChildCollectionId,
    pub(crate) child_type: TypeId,
    pub(crate) separator: char,
    pub(crate) immutable: bool,
    pub(crate) target: TargetBinding,
}

impl IdsReferenceCollection {
    pub fn reference_id(&self) -> IdsReferenceCollectionId {
        self.id
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// The list-carrying child of `parent`, if present.
    pub fn source_child(&self, model: &ModelInstance, parent: NodeId) -> Option<NodeId> {
        self.carriers(model, parent).first().copied()
    }

    fn split(&self, text: &str) -> Vec<String> {
        text.split(self.separator)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn join(&self, identifiers: &[String]) -> String {
        let mut separator = [0; 4];
        identifiers.join(&*self.separator.encode_utf8(&mut separator))
    }

    fn list(&self, model: &ModelInstance, parent: NodeId) -> Option<(NodeId, Vec<String>)> {
        let child = self.source_child(model, parent)?;
        Some((child, self.split(model.text(child).unwrap_or_default())))
    }
}

impl Reference for IdsReferenceCollection {
    fn id(&self) -> AnyReferenceId {
        AnyReferenceId::Ids(self.id)
    }

    fn source_type(&self) -> TypeId {
        self.source_type
    }

    fn target(&self) -> &TargetBinding {
        &self.target
    }

    fn stored_identifiers(&self, model: &ModelInstance, carrier: NodeId) -> Vec<String> {
        self.list(model, carrier)
            .map(|(_, identifiers)| identifiers)
            .unwrap_or_default()
    }

    fn update_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        old: &str,
        new: &str,
    ) -> Result<bool, ModelError> {
        let Some((child, mut identifiers)) = self.list(model, carrier) else {
            return Ok(false);
        };
        let mut changed = false;
        for identifier in identifiers.iter_mut().filter(|id| id.as_str() == old) {
            *identifier = new.to_owned();
            changed = true;
        }
        if changed {
            model.set_text(child, self.join(&identifiers))?;
        }
        Ok(changed)
    }

    fn remove_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        identifier: &str,
    ) -> Result<bool, ModelError> {
        let Some((child, mut identifiers)) = self.list(model, carrier) else {
            return Ok(false);
        };
        let Some(position) = identifiers.iter().position(|id| id == identifier) else {
            return Ok(false);
        };
        identifiers.remove(position);
        if identifiers.is_empty() {
            model.remove_element(child)?;
        } else {
            model.set_text(child, self.join(&identifiers))?;
        }
        Ok(true)
    }
}

impl ReferenceCollection for IdsReferenceCollection {
    fn child_collection(&self) -> ChildCollectionId {
        self.collection
    }

    fn is_immutable(&self) -> bool {
        self.immutable
    }

    fn perform_add(
        &self,
        model: &mut ModelInstance,
        parent: NodeId,
        identifier: &str,
    ) -> Result<(), ModelError> {
        match self.list(model, parent) {
            Some((child, mut identifiers)) => {
                identifiers.push(identifier.to_owned());
                model.set_text(child, self.join(&identifiers))
            }
            None => {
                let child = model.create_element(self.child_type);
                model.set_text(child, identifier)?;
                model.add_collection_child(parent, self.collection, child)
            }
        }
    }
}
