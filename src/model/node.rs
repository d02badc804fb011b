use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::{NodeId, TypeId};

/// Storage for one element of a model instance.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) ty: TypeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Attribute values in insertion order.
    pub(crate) attributes: IndexMap<SmolStr, String>,
    pub(crate) text: Option<String>,
}

impl Node {
    pub(crate) fn new(ty: TypeId) -> Self {
        Self {
            ty,
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
            text: None,
        }
    }
}
