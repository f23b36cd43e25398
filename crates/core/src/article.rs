//! The article record produced by a run.

use std::fmt;

/// Marker stored when body text was requested but could not be extracted.
pub const CONTENT_UNAVAILABLE: &str = "Content not available";

/// Body text of an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleContent {
    /// Extracted text, never empty.
    Text(String),
    /// Extraction was attempted and failed.
    Unavailable,
}

impl ArticleContent {
    /// Wrap extracted text, turning empty or whitespace-only input into [`ArticleContent::Unavailable`].
    pub fn from_extracted(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => ArticleContent::Text(text),
            _ => ArticleContent::Unavailable,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ArticleContent::Text(text) => text,
            ArticleContent::Unavailable => CONTENT_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ArticleContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One article found on the listing page.
///
/// A record only exists once id, URL and title are all non-empty, and it is
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    id: String,
    url: String,
    title: String,
    content: Option<ArticleContent>,
}

impl ArticleRecord {
    /// Build a record, collapsing every whitespace run in the title to one space.
    /// Returns `None` when any required field is empty.
    pub fn new(id: impl Into<String>, url: impl Into<String>, title: &str) -> Option<Self> {
        let id = id.into();
        let url = url.into();
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

        if id.is_empty() || url.trim().is_empty() || title.is_empty() {
            return None;
        }

        Some(Self { id, url, title, content: None })
    }

    /// Attach body text.
    pub fn with_content(self, content: ArticleContent) -> Self {
        Self { content: Some(content), ..self }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text, if it was requested.
    pub fn content(&self) -> Option<&ArticleContent> {
        self.content.as_ref()
    }

    /// Body text for display: the text, or the unavailable marker when absent.
    pub fn content_or_marker(&self) -> &str {
        self.content.as_ref().map_or(CONTENT_UNAVAILABLE, ArticleContent::as_str)
    }
}
