//! The mutable element tree of one model.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::trace;

use super::node::Node;
use crate::base::{AttributeId, ChildCollectionId, ElementId, NodeId, TypeId};
use crate::error::ModelError;
use crate::schema::TypeRegistry;

/// One live document of a schema.
///
/// Elements are created detached with [`create_element`](Self::create_element)
/// and become part of the model once attached below the root. Only attached
/// elements are reachable through [`element_by_id`](Self::element_by_id) and
/// [`elements_of_type`](Self::elements_of_type).
///
/// Mutations take `&mut self`; an instance shared between threads has to be
/// guarded by the caller.
#[derive(Clone, Debug)]
pub struct ModelInstance {
    schema: Arc<TypeRegistry>,
    nodes: Vec<Option<Node>>,
    root: Option<NodeId>,
    ids: FxHashMap<String, NodeId>,
}

impl ModelInstance {
    /// Create an empty model of `schema`.
    pub fn new(schema: Arc<TypeRegistry>) -> Self {
        Self {
            schema,
            nodes: Vec::new(),
            root: None,
            ids: FxHashMap::default(),
        }
    }

    pub fn schema(&self) -> &Arc<TypeRegistry> {
        &self.schema
    }

    // ── Nodes ───────────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> Result<&Node, ModelError> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(ModelError::UnknownElement(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, ModelError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(ModelError::UnknownElement(id))
    }

    /// Whether `node` denotes a live (not removed) element of this model.
    pub fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_ok()
    }

    /// Number of live elements, attached or not.
    pub fn element_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn element_type(&self, node: NodeId) -> Result<TypeId, ModelError> {
        Ok(self.node(node)?.ty)
    }

    pub fn type_name(&self, node: NodeId) -> Option<&str> {
        let ty = self.node(node).ok()?.ty;
        Some(self.schema.type_name(ty))
    }

    /// Whether `node` is an instance of `ty` or one of its subtypes.
    pub fn is_instance_of(&self, node: NodeId, ty: TypeId) -> bool {
        self.node(node)
            .is_ok_and(|n| self.schema.is_base_type_of(ty, n.ty))
    }

    /// Fail unless `node` is a live instance of `ty`.
    pub(crate) fn expect_instance(&self, node: NodeId, ty: TypeId) -> Result<(), ModelError> {
        let actual = self.node(node)?.ty;
        if self.schema.is_base_type_of(ty, actual) {
            Ok(())
        } else {
            Err(ModelError::WrongSourceType {
                element: node,
                expected: SmolStr::new(self.schema.type_name(ty)),
                found: SmolStr::new(self.schema.type_name(actual)),
            })
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok()?.parent
    }

    /// Children of `node` in document order; empty for removed elements.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Whether `node` is the root or a descendant of it.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            match self.node(current) {
                Ok(n) => match n.parent {
                    Some(parent) => current = parent,
                    None => return self.root == Some(current),
                },
                Err(_) => return false,
            }
        }
    }

    // ── Creation ────────────────────────────────────────────────────

    /// Create a detached element of type `ty`.
    pub fn create_element(&mut self, ty: TypeId) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Some(Node::new(ty)));
        id
    }

    /// Create a detached element and set its identifier attribute.
    pub fn create_element_with_id(
        &mut self,
        ty: TypeId,
        identifier: &str,
    ) -> Result<NodeId, ModelError> {
        let attribute = self
            .schema
            .id_attribute(ty)
            .ok_or_else(|| ModelError::MissingIdAttribute {
                type_name: SmolStr::new(self.schema.type_name(ty)),
            })?;
        let name = self.schema.attribute(attribute).name.clone();
        let node = self.create_element(ty);
        self.node_mut(node)?
            .attributes
            .insert(name, identifier.to_owned());
        Ok(node)
    }

    /// A fresh identifier for an element of type `ty`.
    pub fn generate_identifier(&self, ty: TypeId) -> ElementId {
        ElementId::generate(self.schema.type_name(ty))
    }

    /// Make a detached element the document root.
    pub fn set_root(&mut self, node: NodeId) -> Result<(), ModelError> {
        if let Some(root) = self.root {
            return Err(ModelError::RootAlreadySet(root));
        }
        if self.node(node)?.parent.is_some() {
            return Err(ModelError::AlreadyAttached(node));
        }
        self.index_subtree(node)?;
        self.root = Some(node);
        Ok(())
    }

    // ── Identifiers ─────────────────────────────────────────────────

    /// Look up an attached element by identifier.
    pub fn element_by_id(&self, identifier: &str) -> Option<NodeId> {
        self.ids.get(identifier).copied()
    }

    /// The value of the element's identifier attribute.
    pub fn identifier_of(&self, node: NodeId) -> Option<&str> {
        let name = self.id_attribute_name(node)?;
        self.attribute(node, name)
    }

    fn id_attribute_name(&self, node: NodeId) -> Option<&str> {
        let ty = self.node(node).ok()?.ty;
        let attribute = self.schema.id_attribute(ty)?;
        Some(self.schema.attribute(attribute).name())
    }

    fn is_id_attribute(&self, node: NodeId, name: &str) -> bool {
        self.id_attribute_name(node) == Some(name)
    }

    /// Identifiers carried by `node` and its descendants.
    fn subtree_identifiers(&self, node: NodeId) -> Vec<(String, NodeId)> {
        self.subtree(node)
            .into_iter()
            .filter_map(|n| self.identifier_of(n).map(|id| (id.to_owned(), n)))
            .collect()
    }

    /// Add the identifiers of a subtree to the index.
    fn index_subtree(&mut self, node: NodeId) -> Result<(), ModelError> {
        let entries = self.subtree_identifiers(node);
        let mut seen = FxHashSet::default();
        for (identifier, _) in &entries {
            if self.ids.contains_key(identifier) || !seen.insert(identifier.as_str()) {
                return Err(ModelError::DuplicateIdentifier(identifier.clone()));
            }
        }
        for (identifier, owner) in entries {
            self.ids.insert(identifier, owner);
        }
        Ok(())
    }

    fn unindex_subtree(&mut self, node: NodeId) {
        for (identifier, owner) in self.subtree_identifiers(node) {
            if self.ids.get(&identifier) == Some(&owner) {
                self.ids.remove(&identifier);
            }
        }
    }

    // ── Attributes ──────────────────────────────────────────────────

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node).ok()?.attributes.get(name).map(String::as_str)
    }

    /// All attributes of `node` in insertion order.
    pub fn attributes(&self, node: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.node(node)
            .into_iter()
            .flat_map(|n| n.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Set an attribute value.
    ///
    /// If the attribute identifies the element and its value changes, every
    /// reference to the old identifier is rewritten to the new one.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ModelError> {
        let value = value.into();
        let old = self.write_attribute(node, name, value.clone())?;
        if let Some(old) = old.filter(|old| *old != value) {
            self.propagate_rename(node, name, &old, &value)?;
        }
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    ///
    /// Removing an identifier removes every reference to it.
    pub fn remove_attribute(
        &mut self,
        node: NodeId,
        name: &str,
    ) -> Result<Option<String>, ModelError> {
        if self.attribute(node, name).is_none() {
            self.node(node)?;
            return Ok(None);
        }
        if self.is_attached(node) {
            self.unlink_attribute(node, name)?;
        }
        self.erase_attribute(node, name)
    }

    /// Write an attribute without notifying references.
    pub(crate) fn write_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: String,
    ) -> Result<Option<String>, ModelError> {
        let old = self.node(node)?.attributes.get(name).cloned();
        if self.is_id_attribute(node, name) && self.is_attached(node) {
            if let Some(&owner) = self.ids.get(&value) {
                if owner != node {
                    return Err(ModelError::DuplicateIdentifier(value));
                }
            }
            if let Some(old) = &old {
                self.ids.remove(old);
            }
            self.ids.insert(value.clone(), node);
        }
        self.node_mut(node)?.attributes.insert(SmolStr::new(name), value);
        Ok(old)
    }

    /// Remove an attribute without notifying references.
    pub(crate) fn erase_attribute(
        &mut self,
        node: NodeId,
        name: &str,
    ) -> Result<Option<String>, ModelError> {
        let is_indexed = self.is_id_attribute(node, name) && self.is_attached(node);
        let old = self.node_mut(node)?.attributes.shift_remove(name);
        if let (true, Some(old)) = (is_indexed, &old) {
            if self.ids.get(old) == Some(&node) {
                self.ids.remove(old);
            }
        }
        Ok(old)
    }

    // ── Text ────────────────────────────────────────────────────────

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.node(node).ok()?.text.as_deref()
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<(), ModelError> {
        self.node_mut(node)?.text = Some(text.into());
        Ok(())
    }

    pub fn clear_text(&mut self, node: NodeId) -> Result<Option<String>, ModelError> {
        Ok(self.node_mut(node)?.text.take())
    }

    // ── Tree edits ──────────────────────────────────────────────────

    /// Attach a detached element as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ModelError> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Attach a detached element at `index` among the children of `parent`.
    ///
    /// Indices past the end append.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), ModelError> {
        self.node(parent)?;
        if self.node(child)?.parent.is_some() || self.root == Some(child) {
            return Err(ModelError::AlreadyAttached(child));
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(ModelError::Cycle { parent, child });
            }
            ancestor = self.parent(current);
        }
        if self.is_attached(parent) {
            self.index_subtree(child)?;
        }

        let children = &mut self.node_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Attach `child` among the members of `collection` below `parent`.
    ///
    /// The child goes after existing children of its collection and before
    /// children of collections declared after it.
    pub(crate) fn add_collection_child(
        &mut self,
        parent: NodeId,
        collection: ChildCollectionId,
        child: NodeId,
    ) -> Result<(), ModelError> {
        let parent_type = self.node(parent)?.ty;
        let schema = Arc::clone(&self.schema);
        let own_type = schema.child_collection(collection).child_type();
        let order = schema.all_child_collections(parent_type);
        let later: Vec<TypeId> = match order.iter().position(|c| *c == collection) {
            Some(pos) => order[pos + 1..]
                .iter()
                .map(|c| schema.child_collection(*c).child_type())
                .collect(),
            None => Vec::new(),
        };
        let index = self
            .children(parent)
            .iter()
            .position(|&c| {
                !self.is_instance_of(c, own_type)
                    && later.iter().any(|&ty| self.is_instance_of(c, ty))
            })
            .unwrap_or(self.children(parent).len());
        self.insert_child(parent, index, child)
    }

    /// Remove `child` from `parent`, see [`remove_element`](Self::remove_element).
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ModelError> {
        if self.node(child)?.parent != Some(parent) {
            return Err(ModelError::NotAChild { parent, child });
        }
        self.remove_element(child)
    }

    /// Remove an element and its descendants from the model.
    ///
    /// Before anything is detached, every reference to the element or one of
    /// its descendants is removed.
    pub fn remove_element(&mut self, node: NodeId) -> Result<(), ModelError> {
        self.node(node)?;
        if self.is_attached(node) {
            for descendant in self.subtree(node) {
                if self.contains(descendant) {
                    self.unlink_references(descendant)?;
                }
            }
            if !self.contains(node) {
                return Ok(());
            }
            self.unindex_subtree(node);
        }
        self.detach(node)?;
        for descendant in self.subtree(node) {
            self.nodes[descendant.index()] = None;
        }
        trace!("removed element {}", node);
        Ok(())
    }

    /// Put a detached element in place of an existing one.
    ///
    /// References into the descendants of `existing` are removed; references
    /// to `existing` itself follow the replacement, renamed to its identifier.
    /// When the replacement carries no identifier they are removed instead.
    pub fn replace_element(
        &mut self,
        existing: NodeId,
        replacement: NodeId,
    ) -> Result<(), ModelError> {
        let parent = self.node(existing)?.parent;
        if self.node(replacement)?.parent.is_some() || self.root == Some(replacement) {
            return Err(ModelError::AlreadyAttached(replacement));
        }
        if parent.is_none() && self.root != Some(existing) {
            return Err(ModelError::UnknownElement(existing));
        }
        let attached = self.is_attached(existing);

        if attached {
            let replaced: FxHashSet<NodeId> = self.subtree(existing).into_iter().collect();
            let mut seen = FxHashSet::default();
            for (identifier, _) in self.subtree_identifiers(replacement) {
                let taken = self
                    .ids
                    .get(&identifier)
                    .is_some_and(|owner| !replaced.contains(owner));
                if taken || !seen.insert(identifier.clone()) {
                    return Err(ModelError::DuplicateIdentifier(identifier));
                }
            }
            for descendant in self.subtree(existing).into_iter().skip(1) {
                if self.contains(descendant) {
                    self.unlink_references(descendant)?;
                }
            }
        }

        let existing_type = self.node(existing)?.ty;
        let old_id = self.identifier_of(existing).map(str::to_owned);
        let new_id = self.identifier_of(replacement).map(str::to_owned);
        if attached && old_id.is_some() && new_id.is_none() {
            self.unlink_references(existing)?;
        }

        if attached {
            self.unindex_subtree(existing);
        }
        match parent {
            Some(parent) => {
                let children = &mut self.node_mut(parent)?.children;
                if let Some(pos) = children.iter().position(|c| *c == existing) {
                    children[pos] = replacement;
                }
                self.node_mut(replacement)?.parent = Some(parent);
            }
            None => self.root = Some(replacement),
        }
        for descendant in self.subtree(existing) {
            self.nodes[descendant.index()] = None;
        }
        if attached {
            self.index_subtree(replacement)?;
        }

        if let (true, Some(old_id), Some(new_id)) = (attached, old_id, new_id) {
            if old_id != new_id {
                if let Some(attribute) = self.schema.id_attribute(existing_type) {
                    self.propagate_rename_of(replacement, attribute, &old_id, &new_id)?;
                }
            }
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) -> Result<(), ModelError> {
        match self.node(node)?.parent {
            Some(parent) => {
                self.node_mut(parent)?.children.retain(|c| *c != node);
                self.node_mut(node)?.parent = None;
            }
            None if self.root == Some(node) => self.root = None,
            None => {}
        }
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Children of `parent` that belong to `collection`, in document order.
    pub fn child_elements(&self, parent: NodeId, collection: ChildCollectionId) -> Vec<NodeId> {
        let child_type = self.schema.child_collection(collection).child_type();
        self.children_of_type(parent, child_type)
    }

    /// Children of `parent` that are instances of `ty`.
    pub fn children_of_type(&self, parent: NodeId, ty: TypeId) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&c| self.is_instance_of(c, ty))
            .collect()
    }

    /// Attached instances of `ty` (or its subtypes) in document order.
    pub fn elements_of_type(&self, ty: TypeId) -> Vec<NodeId> {
        match self.root {
            Some(root) => self
                .subtree(root)
                .into_iter()
                .filter(|&n| self.is_instance_of(n, ty))
                .collect(),
            None => Vec::new(),
        }
    }

    /// `node` followed by its descendants in document order.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if !self.contains(node) {
            return result;
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    // ── Propagation ─────────────────────────────────────────────────

    fn propagate_rename(
        &mut self,
        node: NodeId,
        name: &str,
        old: &str,
        new: &str,
    ) -> Result<(), ModelError> {
        if !self.is_attached(node) {
            return Ok(());
        }
        let ty = self.node(node)?.ty;
        match self.schema.find_attribute(ty, name) {
            Some(attribute) => self.propagate_rename_of(node, attribute, old, new),
            None => Ok(()),
        }
    }

    fn propagate_rename_of(
        &mut self,
        node: NodeId,
        attribute: AttributeId,
        old: &str,
        new: &str,
    ) -> Result<(), ModelError> {
        let schema = Arc::clone(&self.schema);
        for &reference in schema.attribute(attribute).incoming_references() {
            let updated = schema
                .reference(reference)
                .on_target_renamed(self, node, old, new)
                .map_err(|err| ModelError::propagation(format!("{reference}: {err}")))?;
            trace!(
                "rename {} -> {} updated {} element(s) via {:?}",
                old, new, updated, reference
            );
        }
        Ok(())
    }

    fn unlink_attribute(&mut self, node: NodeId, name: &str) -> Result<(), ModelError> {
        let schema = Arc::clone(&self.schema);
        let ty = self.node(node)?.ty;
        let Some(attribute) = schema.find_attribute(ty, name) else {
            return Ok(());
        };
        let Some(identifier) = self.attribute(node, name).map(str::to_owned) else {
            return Ok(());
        };
        for &reference in schema.attribute(attribute).incoming_references() {
            let removed = schema
                .reference(reference)
                .on_target_removed(self, node, &identifier)
                .map_err(|err| ModelError::propagation(format!("{reference}: {err}")))?;
            trace!(
                "unlink {} removed {} reference(s) via {:?}",
                identifier, removed, reference
            );
        }
        Ok(())
    }

    /// Remove every reference to any identifier-carrying attribute of `node`.
    fn unlink_references(&mut self, node: NodeId) -> Result<(), ModelError> {
        let schema = Arc::clone(&self.schema);
        let ty = self.node(node)?.ty;
        for attribute in schema.all_attributes(ty) {
            let decl = schema.attribute(attribute);
            if decl.incoming_references().is_empty() {
                continue;
            }
            self.unlink_attribute(node, decl.name())?;
        }
        Ok(())
    }
}
