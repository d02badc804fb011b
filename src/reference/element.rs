//! References stored in the text of a single child element.

use super::{AnyReferenceId, ElementReferenceId, Reference, ScalarReference, TargetBinding};
use crate::base::{ChildCollectionId, NodeId, TypeId};
use crate::error::ModelError;
use crate::model::ModelInstance;

/// The identifier of the target is the text of one child of the source
/// element, for example `<dataInputAssociation><targetRef>Input_1</targetRef>`.
///
/// The source child is created on first write and removed when the reference
/// is cleared. At most one source child exists per source element.
#[derive(Clone, Debug)]
pub struct ElementReference {
    pub(crate) id: ElementReferenceId,
    pub(crate) source_type: TypeId,
    pub(crate) collection: ChildCollectionId,
    pub(crate) child_type: TypeId,
    pub(crate) target: TargetBinding,
}

impl ElementReference {
    pub fn reference_id(&self) -> ElementReferenceId {
        self.id
    }

    /// The child collection holding the source child.
    pub fn child_collection(&self) -> ChildCollectionId {
        self.collection
    }

    /// The source child of `source`, if present.
    pub fn source_child(&self, model: &ModelInstance, source: NodeId) -> Option<NodeId> {
        model.child_elements(source, self.collection).first().copied()
    }

    fn stored(&self, model: &ModelInstance, source: NodeId) -> Option<(NodeId, String)> {
        let child = self.source_child(model, source)?;
        let text = model.text(child).unwrap_or_default().trim();
        (!text.is_empty()).then(|| (child, text.to_owned()))
    }
}

impl Reference for ElementReference {
    fn id(&self) -> AnyReferenceId {
        AnyReferenceId::Element(self.id)
    }

    fn source_type(&self) -> TypeId {
        self.source_type
    }

    fn target(&self) -> &TargetBinding {
        &self.target
    }

    fn stored_identifiers(&self, model: &ModelInstance, carrier: NodeId) -> Vec<String> {
        self.stored(model, carrier)
            .map(|(_, identifier)| identifier)
            .into_iter()
            .collect()
    }

    fn update_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        old: &str,
        new: &str,
    ) -> Result<bool, ModelError> {
        match self.stored(model, carrier) {
            Some((child, identifier)) if identifier == old => {
                model.set_text(child, new)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        identifier: &str,
    ) -> Result<bool, ModelError> {
        match self.stored(model, carrier) {
            Some((child, stored)) if stored == identifier => {
                model.remove_element(child)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl ScalarReference for ElementReference {
    fn resolve_identifier(
        &self,
        model: &ModelInstance,
        source: NodeId,
    ) -> Result<Option<String>, ModelError> {
        model.expect_instance(source, self.source_type)?;
        Ok(self.stored(model, source).map(|(_, identifier)| identifier))
    }

    fn write_identifier(
        &self,
        model: &mut ModelInstance,
        source: NodeId,
        identifier: &str,
    ) -> Result<(), ModelError> {
        model.expect_instance(source, self.source_type)?;
        match self.source_child(model, source) {
            Some(child) => model.set_text(child, identifier),
            None => {
                let child = model.create_element(self.child_type);
                model.set_text(child, identifier)?;
                model.add_collection_child(source, self.collection, child)
            }
        }
    }

    fn clear_target(&self, model: &mut ModelInstance, source: NodeId) -> Result<(), ModelError> {
        model.expect_instance(source, self.source_type)?;
        match self.source_child(model, source) {
            Some(child) => model.remove_element(child),
            None => Ok(()),
        }
    }
}
