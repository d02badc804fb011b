//! Error types for schema building and model operations.

use crate::base::NodeId;
use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while assembling a schema.
///
/// These are schema-authoring mistakes: the schema fails to build and no
/// [`TypeRegistry`](crate::schema::TypeRegistry) is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A reference targets a type without an identifier attribute,
    /// neither declared on the type nor inherited.
    #[error("Element type {type_name} has no id attribute")]
    MissingIdAttribute { type_name: SmolStr },

    /// A reference or child collection names an undeclared type.
    #[error("Unknown element type: {0}")]
    UnknownType(SmolStr),

    /// A type extends an undeclared base type.
    #[error("Element type {type_name} extends unknown base type {base_name}")]
    UnknownBaseType { type_name: SmolStr, base_name: SmolStr },

    /// The base-type chain of a type loops back onto itself.
    #[error("Inheritance cycle through element type {0}")]
    InheritanceCycle(SmolStr),
}

/// Errors raised by model operations and reference resolution.
///
/// Every failing operation leaves the model unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A stored identifier does not resolve to any element.
    #[error("Unable to find a model element instance for id {identifier}")]
    NotFound { identifier: String },

    /// A resolved element is not an instance of the expected type.
    #[error("Element {identifier} is of type {found}, expected {expected}")]
    TypeMismatch {
        identifier: String,
        expected: SmolStr,
        found: SmolStr,
    },

    /// The target of a reference is not part of the model.
    #[error(
        "Cannot create reference to model element {element}: element is not part of model. \
         Please connect element to the model first."
    )]
    NotConnected { element: NodeId },

    /// The operation is not available on this collection.
    #[error("Operation {operation} is unsupported: {reason}")]
    Unsupported {
        operation: &'static str,
        reason: &'static str,
    },

    /// The handle does not denote a live element of this model.
    #[error("Unknown element: {0}")]
    UnknownElement(NodeId),

    /// An element was passed where an instance of another type was required.
    #[error("Element {element} of type {found} cannot be used as {expected}")]
    WrongSourceType {
        element: NodeId,
        expected: SmolStr,
        found: SmolStr,
    },

    /// The element already has a parent or is the document root.
    #[error("Element {0} is already attached to the model")]
    AlreadyAttached(NodeId),

    /// The element would become its own ancestor.
    #[error("Element {child} cannot be inserted below its own descendant {parent}")]
    Cycle { parent: NodeId, child: NodeId },

    /// The element is not a child of the given parent.
    #[error("Element {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// The model already has a document root.
    #[error("Model already has root element {0}")]
    RootAlreadySet(NodeId),

    /// The element type declares no identifier attribute, own or inherited.
    #[error("Element type {type_name} has no id attribute")]
    MissingIdAttribute { type_name: SmolStr },

    /// Another element of the model already uses the identifier.
    #[error("Identifier {0} is already used in the model")]
    DuplicateIdentifier(String),

    /// A rename or removal could not be propagated to a referencing element.
    #[error("Reference propagation failed: {0}")]
    Propagation(String),
}

impl ModelError {
    /// Create an unsupported-operation error for an immutable collection.
    pub fn immutable(operation: &'static str) -> Self {
        Self::Unsupported {
            operation,
            reason: "collection is immutable",
        }
    }

    /// Create a not-found error.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a propagation error.
    pub fn propagation(message: impl Into<String>) -> Self {
        Self::Propagation(message.into())
    }
}
