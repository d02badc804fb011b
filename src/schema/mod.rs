//! Schema: element types and the references between them.
//!
//! A schema is declared once with a [`SchemaBuilder`] and then frozen into a
//! [`TypeRegistry`] shared by every model instance built against it.
//!
//! ## Design
//!
//! The registry is an explicit type table. Each [`ElementType`] stores the
//! index of its base type and a map of the attributes it declares itself;
//! inherited lookup walks the base chain.
//!
//! ```text
//! TypeRegistry
//! ├── types: Vec<ElementType>           (TypeId → type, base index, extending)
//! ├── attributes: Vec<AttributeDecl>    (incoming / outgoing references)
//! ├── child_collections: Vec<ChildCollection>
//! └── references: one Vec per strategy  (bound at build time)
//! ```

mod builder;
mod element_type;
mod registry;

pub use builder::{AttributeBuilder, ChildElementBuilder, ElementTypeBuilder, SchemaBuilder};
pub use element_type::{AttributeDecl, ChildCollection, ElementType};
pub use registry::TypeRegistry;
