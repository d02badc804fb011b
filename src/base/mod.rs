//! Foundation types for xref.
//!
//! This module provides the primitives used throughout the crate:
//! - [`TypeId`], [`AttributeId`], [`ChildCollectionId`] - Handles into a [`TypeRegistry`](crate::schema::TypeRegistry)
//! - [`NodeId`] - Handle to an element of one [`ModelInstance`](crate::model::ModelInstance)
//! - [`ElementId`] - Owned element identifier, with UUID generation
//! - [`qname`] - Qualified-name and URI-fragment helpers
//!
//! This module has NO dependencies on other xref modules.

mod handles;
mod id;
pub mod qname;

pub use handles::{AttributeId, ChildCollectionId, NodeId, TypeId};
pub(crate) use handles::index_handle;
pub use id::ElementId;
