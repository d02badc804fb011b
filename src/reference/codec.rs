//! Stored forms of identifiers.

use smol_str::SmolStr;

use crate::base::NodeId;
use crate::base::qname::{local_name, prefix, to_uri_reference, uri_fragment};
use crate::error::ModelError;
use crate::model::ModelInstance;

/// How an attribute reference stores its identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentifierFormat {
    /// The attribute holds the bare identifier.
    #[default]
    Plain,
    /// The attribute holds a qualified name; the prefix is ignored on read.
    QName,
}

impl IdentifierFormat {
    /// The identifier part of a stored value.
    pub fn decode(self, stored: &str) -> &str {
        match self {
            Self::Plain => stored,
            Self::QName => local_name(stored),
        }
    }

    /// The stored value after renaming its identifier to `new`.
    ///
    /// A qualified name keeps its prefix.
    pub fn rename(self, stored: &str, new: &str) -> String {
        match self {
            Self::Plain => new.to_owned(),
            Self::QName => with_prefix_of(stored, new),
        }
    }
}

fn with_prefix_of(stored: &str, new: &str) -> String {
    match prefix(stored) {
        Some(prefix) => format!("{prefix}:{new}"),
        None => new.to_owned(),
    }
}

/// How each member of an element reference collection stores its identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CollectionEncoding {
    /// The member's text is the identifier.
    #[default]
    Text,
    /// The member's text is a qualified name.
    QName,
    /// The member's `attribute` holds a URI whose fragment is the identifier.
    Uri { attribute: SmolStr },
}

impl CollectionEncoding {
    /// The decoded identifier stored in `member`.
    pub(crate) fn read(&self, model: &ModelInstance, member: NodeId) -> Option<String> {
        let stored = match self {
            Self::Text => model.text(member)?.trim(),
            Self::QName => local_name(model.text(member)?.trim()),
            Self::Uri { attribute } => uri_fragment(model.attribute(member, attribute)?),
        };
        (!stored.is_empty()).then(|| stored.to_owned())
    }

    /// Store `identifier` in `member`.
    pub(crate) fn write(
        &self,
        model: &mut ModelInstance,
        member: NodeId,
        identifier: &str,
    ) -> Result<(), ModelError> {
        match self {
            Self::Text | Self::QName => model.set_text(member, identifier),
            Self::Uri { attribute } => model
                .write_attribute(member, attribute, to_uri_reference(identifier))
                .map(drop),
        }
    }

    /// Rewrite the identifier stored in `member` to `new`, keeping any
    /// prefix or document part of the stored value.
    pub(crate) fn rename(
        &self,
        model: &mut ModelInstance,
        member: NodeId,
        new: &str,
    ) -> Result<(), ModelError> {
        match self {
            Self::Text => model.set_text(member, new),
            Self::QName => {
                let stored = model.text(member).unwrap_or_default().trim();
                let renamed = with_prefix_of(stored, new);
                model.set_text(member, renamed)
            }
            Self::Uri { attribute } => {
                let stored = model.attribute(member, attribute).unwrap_or_default();
                let renamed = match stored.rfind('#') {
                    Some(pos) => format!("{}{new}", &stored[..=pos]),
                    None => to_uri_reference(new),
                };
                model.write_attribute(member, attribute, renamed).map(drop)
            }
        }
    }
}
