//! Live element trees.
//!
//! A [`ModelInstance`] is one mutable document of a schema: elements with
//! attributes, text and ordered children, plus an index from identifier to
//! element. Edits made through the instance keep references consistent:
//!
//! - changing an identifier attribute renames every reference to it
//! - removing an element (or its identifier) removes every reference to it
//!
//! ```text
//! ModelInstance
//! ├── schema: Arc<TypeRegistry>
//! ├── nodes: Vec<Option<Node>>     (NodeId → node, None once removed)
//! ├── root: Option<NodeId>
//! └── ids: FxHashMap<String, NodeId>  (attached elements only)
//! ```

mod instance;
mod node;

pub use instance::ModelInstance;
