//! Schema configuration

use smol_str::SmolStr;

/// Defaults applied by reference builders when a schema is declared.
///
/// Individual references can override these values through their builder.
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    /// Separator between entries of an identifier-list reference
    pub id_list_separator: char,
    /// Attribute holding the `#id` value of a URI reference collection
    pub uri_attribute: SmolStr,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            id_list_separator: ' ',
            uri_attribute: SmolStr::new_static("href"),
        }
    }
}

impl SchemaConfig {
    /// Use a different identifier-list separator.
    pub fn with_id_list_separator(mut self, separator: char) -> Self {
        self.id_list_separator = separator;
        self
    }

    /// Use a different attribute for URI references.
    pub fn with_uri_attribute(mut self, name: impl Into<SmolStr>) -> Self {
        self.uri_attribute = name.into();
        self
    }
}
