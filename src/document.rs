use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

/// Stable document identifier, used as the row label of the output matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Index(u64),
    Name(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Index(i) => write!(f, "{}", i),
            DocumentId::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for DocumentId {
    fn from(value: u64) -> Self {
        DocumentId::Index(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        DocumentId::Name(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        DocumentId::Name(value)
    }
}

/// One input document.
///
/// The content is kept as raw bytes; it is decoded (strictly, as UTF-8) only
/// when the normalizer reaches it, so a malformed document is reported with
/// its position instead of failing at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    id: Option<DocumentId>,
    content: Cow<'a, [u8]>,
}

impl<'a> Document<'a> {
    /// Document from text, without identifier
    pub fn new(text: &'a str) -> Self {
        Self {
            id: None,
            content: Cow::Borrowed(text.as_bytes()),
        }
    }

    /// Document from raw bytes, which may not be valid UTF-8
    pub fn from_bytes(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            id: None,
            content: bytes.into(),
        }
    }

    /// Document from owned text
    pub fn owned(text: String) -> Document<'static> {
        Document {
            id: None,
            content: Cow::Owned(text.into_bytes()),
        }
    }

    pub fn with_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    /// Row label for this document at input position `index`
    pub(crate) fn label(&self, index: usize) -> DocumentId {
        self.id
            .clone()
            .unwrap_or(DocumentId::Index(index as u64))
    }
}

impl<'a> From<&'a str> for Document<'a> {
    fn from(text: &'a str) -> Self {
        Document::new(text)
    }
}

impl<'a> From<&'a String> for Document<'a> {
    fn from(text: &'a String) -> Self {
        Document::new(text.as_str())
    }
}

impl From<String> for Document<'static> {
    fn from(text: String) -> Self {
        Document::owned(text)
    }
}
