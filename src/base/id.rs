use std::sync::Arc;

/// Unique identifier of an element within one model instance.
///
/// This is the value stored in an element's identifier attribute and in
/// every location that references the element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub Arc<str>);

impl ElementId {
    /// Create a new element ID.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier of the form `<prefix>_<uuid>`.
    ///
    /// The prefix is usually the element type name, so generated ids stay
    /// readable in serialized documents.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}_{}", uuid::Uuid::new_v4()).into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
