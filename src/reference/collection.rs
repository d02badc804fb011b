//! References stored one per child element.

use super::{
    AnyReferenceId, CollectionEncoding, ElementReferenceCollectionId, Reference,
    ReferenceCollection, TargetBinding,
};
use crate::base::{ChildCollectionId, NodeId, TypeId};
use crate::error::ModelError;
use crate::model::ModelInstance;

/// Each child of one declared kind stores the identifier of one target,
/// for example the `flowNodeRef` children of a `lane`.
///
/// Members are read through their [`CollectionEncoding`]: as text, as a
/// qualified name in the text, or as the fragment of a URI attribute.
#[derive(Clone, Debug)]
pub struct ElementReferenceCollection {
    pub(crate) id: ElementReferenceCollectionId,
    pub(crate) source_type: TypeId,
    pub(crate) collection: ChildCollectionId,
    pub(crate) child_type: TypeId,
    pub(crate) encoding: CollectionEncoding,
    pub(crate) immutable: bool,
    pub(crate) target: TargetBinding,
}

impl ElementReferenceCollection {
    pub fn reference_id(&self) -> ElementReferenceCollectionId {
        self.id
    }

    pub fn encoding(&self) -> &CollectionEncoding {
        &self.encoding
    }

    fn members(&self, model: &ModelInstance, parent: NodeId) -> Vec<(NodeId, Option<String>)> {
        self.carriers(model, parent)
            .into_iter()
            .map(|member| (member, self.encoding.read(model, member)))
            .collect()
    }
}

impl Reference for ElementReferenceCollection {
    fn id(&self) -> AnyReferenceId {
        AnyReferenceId::ElementCollection(self.id)
    }

    fn source_type(&self) -> TypeId {
        self.source_type
    }

    fn target(&self) -> &TargetBinding {
        &self.target
    }

    fn stored_identifiers(&self, model: &ModelInstance, carrier: NodeId) -> Vec<String> {
        self.members(model, carrier)
            .into_iter()
            .filter_map(|(_, identifier)| identifier)
            .collect()
    }

    fn update_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        old: &str,
        new: &str,
    ) -> Result<bool, ModelError> {
        let mut changed = false;
        for (member, identifier) in self.members(model, carrier) {
            if identifier.as_deref() == Some(old) {
                self.encoding.rename(model, member, new)?;
                changed = true;
            }
        }
        Ok(changed)
    }

    fn remove_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        identifier: &str,
    ) -> Result<bool, ModelError> {
        let doomed: Vec<NodeId> = self
            .members(model, carrier)
            .into_iter()
            .filter(|(_, stored)| stored.as_deref() == Some(identifier))
            .map(|(member, _)| member)
            .collect();
        for &member in &doomed {
            model.remove_element(member)?;
        }
        Ok(!doomed.is_empty())
    }
}

impl ReferenceCollection for ElementReferenceCollection {
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
        let member = model.create_element(self.child_type);
        self.encoding.write(model, member, identifier)?;
        model.add_collection_child(parent, self.collection, member)
    }
}
