//! Article identifiers derived from URLs.
//!
//! Article pages end in `-<digits>.html`; the digit run is the identifier.
//! Navigation, category and advertisement links do not follow that shape,
//! so a `None` here is the normal way non-article links get filtered out.

use std::sync::LazyLock;

use regex::Regex;

static ARTICLE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-(\d+)\.html$").expect("valid article id pattern"));

/// Extract the article identifier from a URL, or `None` when the URL is not an article link.
///
/// # Example
///
/// ```rust
/// use headliner_core::extract_id;
///
/// assert_eq!(extract_id("https://vnexpress.net/some-story-4791234.html"), Some("4791234".to_string()));
/// assert_eq!(extract_id("https://vnexpress.net/the-gioi"), None);
/// ```
pub fn extract_id(url: &str) -> Option<String> {
    ARTICLE_ID.captures(url).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}
