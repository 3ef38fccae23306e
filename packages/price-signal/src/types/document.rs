//! Document types - fetched bodies and their reduced text form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Separator placed between text blocks when they are joined for extraction.
pub const BLOCK_SEPARATOR: &str = " • ";

/// Which transport produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchVia {
    /// Direct request to the document URL
    Primary,
    /// Reader proxy
    Reader,
}

/// A fetched document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedDocument {
    /// URL the caller asked for
    pub url: String,

    /// Body text, verbatim
    pub body: String,

    /// Transport that produced the body
    pub via: FetchVia,
}

impl FetchedDocument {
    pub fn new(url: impl Into<String>, body: impl Into<String>, via: FetchVia) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            via,
        }
    }
}

/// A document flattened into text blocks plus limited metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReducedDocument {
    /// Text blocks in document order
    pub blocks: Vec<String>,

    /// First `<title>` text, if any
    pub title: Option<String>,

    /// Meta tags whose name mentions "date" or "published"
    pub date_metadata: IndexMap<String, String>,
}

impl ReducedDocument {
    /// A plain-text document: one block, no title or metadata.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![text.into()],
            title: None,
            date_metadata: IndexMap::new(),
        }
    }

    /// All blocks joined with [`BLOCK_SEPARATOR`].
    pub fn joined_text(&self) -> String {
        self.blocks.join(BLOCK_SEPARATOR)
    }

    /// Metadata map for single-page results: `title` first, then date metas.
    pub fn meta(&self) -> IndexMap<String, String> {
        let mut meta = IndexMap::with_capacity(self.date_metadata.len() + 1);
        meta.insert("title".to_string(), self.title.clone().unwrap_or_default());
        for (k, v) in &self.date_metadata {
            meta.insert(k.clone(), v.clone());
        }
        meta
    }
}
