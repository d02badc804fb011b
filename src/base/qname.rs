//! Qualified-name and URI-fragment helpers.
//!
//! References may store identifiers in a decorated form: a qualified name
//! (`bpmn:Task_1`) or a same-document URI (`#Task_1`). These helpers map the
//! stored form to the bare identifier and back.

/// Strip a namespace prefix from a qualified name.
///
/// `"ns:foo"` becomes `"foo"`; a name without a prefix is returned as-is.
pub fn local_name(qname: &str) -> &str {
    match qname.split_once(':') {
        Some((_, local)) => local,
        None => qname,
    }
}

/// The namespace prefix of a qualified name, if any.
pub fn prefix(qname: &str) -> Option<&str> {
    qname.split_once(':').map(|(prefix, _)| prefix)
}

/// Extract the fragment of a URI reference.
///
/// Everything up to and including the last `#` is dropped. A value without
/// `#` is taken to be a bare identifier.
pub fn uri_fragment(uri: &str) -> &str {
    match uri.rfind('#') {
        Some(pos) => &uri[pos + 1..],
        None => uri,
    }
}

/// Render an identifier as a same-document URI reference (`#id`).
pub fn to_uri_reference(identifier: &str) -> String {
    format!("#{identifier}")
}
