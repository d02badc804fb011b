//! References stored in an attribute of the source element.

use smol_str::SmolStr;

use super::{
    AnyReferenceId, AttributeReferenceId, IdentifierFormat, Reference, ScalarReference,
    TargetBinding,
};
use crate::base::{AttributeId, NodeId, TypeId};
use crate::error::ModelError;
use crate::model::ModelInstance;

/// The identifier of the target lives in an attribute of the source element,
/// for example `sequenceFlow/@sourceRef`.
///
/// Clearing the reference removes the attribute.
#[derive(Clone, Debug)]
pub struct AttributeReference {
    pub(crate) id: AttributeReferenceId,
    pub(crate) source_type: TypeId,
    pub(crate) source_attribute: AttributeId,
    pub(crate) attribute_name: SmolStr,
    pub(crate) format: IdentifierFormat,
    pub(crate) target: TargetBinding,
}

impl AttributeReference {
    pub fn reference_id(&self) -> AttributeReferenceId {
        self.id
    }

    /// The attribute that stores the identifier.
    pub fn source_attribute(&self) -> AttributeId {
        self.source_attribute
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    pub fn format(&self) -> IdentifierFormat {
        self.format
    }

    fn stored<'m>(&self, model: &'m ModelInstance, source: NodeId) -> Option<&'m str> {
        model.attribute(source, &self.attribute_name)
    }
}

impl Reference for AttributeReference {
    fn id(&self) -> AnyReferenceId {
        AnyReferenceId::Attribute(self.id)
    }

    fn source_type(&self) -> TypeId {
        self.source_type
    }

    fn target(&self) -> &TargetBinding {
        &self.target
    }

    fn stored_identifiers(&self, model: &ModelInstance, carrier: NodeId) -> Vec<String> {
        self.stored(model, carrier)
            .map(|stored| self.format.decode(stored).to_owned())
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
        let renamed = match self.stored(model, carrier) {
            Some(stored) if self.format.decode(stored) == old => self.format.rename(stored, new),
            _ => return Ok(false),
        };
        model.write_attribute(carrier, &self.attribute_name, renamed)?;
        Ok(true)
    }

    fn remove_reference(
        &self,
        model: &mut ModelInstance,
        carrier: NodeId,
        identifier: &str,
    ) -> Result<bool, ModelError> {
        match self.stored(model, carrier) {
            Some(stored) if self.format.decode(stored) == identifier => {
                model.erase_attribute(carrier, &self.attribute_name)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl ScalarReference for AttributeReference {
    fn resolve_identifier(
        &self,
        model: &ModelInstance,
        source: NodeId,
    ) -> Result<Option<String>, ModelError> {
        model.expect_instance(source, self.source_type)?;
        Ok(self
            .stored(model, source)
            .map(|stored| self.format.decode(stored).to_owned()))
    }

    fn write_identifier(
        &self,
        model: &mut ModelInstance,
        source: NodeId,
        identifier: &str,
    ) -> Result<(), ModelError> {
        model.expect_instance(source, self.source_type)?;
        model.write_attribute(source, &self.attribute_name, identifier.to_owned())?;
        Ok(())
    }

    fn clear_target(&self, model: &mut ModelInstance, source: NodeId) -> Result<(), ModelError> {
        model.expect_instance(source, self.source_type)?;
        model.erase_attribute(source, &self.attribute_name)?;
        Ok(())
    }
}
