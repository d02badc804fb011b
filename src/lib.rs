//! # xref-base
//!
//! Typed reference resolution for id-indexed element trees.
//!
//! A schema declares element types, their attributes and child elements, and
//! the *references* between them ("attribute `sourceRef` of `sequenceFlow`
//! holds the id of a `flowNode`"). Once the schema is built, every
//! [`ModelInstance`] of it can resolve, set and clear those references, and
//! renames or removals of referenced elements are propagated to every
//! referencing location.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! reference → Reference contract, strategies, views, builders
//!   ↓
//! model     → Live element tree with identifier index
//!   ↓
//! schema    → Type table, attributes, child collections, SchemaBuilder
//!   ↓
//! base      → Handles (TypeId, NodeId, ...), QName / URI helpers
//! ```

// ============================================================================
// MODULES (dependency order: base → schema → model → reference)
// ============================================================================

/// Foundation types: handles, identifiers, QName and URI helpers
pub mod base;

/// Ambient configuration shared by schema builders
pub mod config;

/// Build-time and runtime error types
pub mod error;

/// Schema: element types, attributes, child collections, two-phase build
pub mod schema;

/// Live element tree with identifier index and change propagation
pub mod model;

/// References: contract, scalar and collection strategies, builders
pub mod reference;

pub use base::{AttributeId, ChildCollectionId, ElementId, NodeId, TypeId};
pub use config::SchemaConfig;
pub use error::{BuildError, ModelError};
pub use model::ModelInstance;
pub use reference::{
    AnyReferenceId, AttributeReference, AttributeReferenceId, CollectionEncoding,
    ElementReference, ElementReferenceCollection, ElementReferenceCollectionId,
    ElementReferenceId, IdentifierFormat, IdsReferenceCollection, IdsReferenceCollectionId,
    Reference, ReferenceCollection, ScalarReference, TargetBinding, TargetView, TargetViewMut,
};
pub use schema::{SchemaBuilder, TypeRegistry};
