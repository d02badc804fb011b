//! Copyable index handles.
//!
//! Handles are plain indices into the table that issued them. A handle from
//! one registry (or one model instance) is meaningless in another.

macro_rules! index_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// Position of this handle in its owning table.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

pub(crate) use index_handle;

index_handle!(
    /// An element type declared in a schema.
    TypeId,
    "type"
);

index_handle!(
    /// An attribute declared on an element type.
    AttributeId,
    "attribute"
);

index_handle!(
    /// A child-element collection declared on an element type.
    ChildCollectionId,
    "children"
);

index_handle!(
    /// An element node inside one model instance.
    NodeId,
    "node"
);
