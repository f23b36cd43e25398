//! Main body text extraction from an article page.
//!
//! Extraction runs in three steps: strip page chrome (navigation, comments,
//! tables, ads) with [`strip_boilerplate`], pick the container most paragraphs
//! vote for with [`scoring::top_candidate`], then flatten that container's
//! block elements into paragraphs separated by blank lines.
//!
//! # Example
//!
//! ```rust
//! use headliner_core::extract_main_text;
//!
//! let html = r#"
//!     <nav><a href="/">Home</a> <a href="/world">World</a></nav>
//!     <article class="fck_detail">
//!         <p>The summit opened on Monday, with delegations from forty countries.</p>
//!     </article>
//! "#;
//! let text = extract_main_text(html).unwrap();
//! assert!(text.starts_with("The summit opened"));
//! assert!(!text.contains("Home"));
//! ```

use scraper::{ElementRef, Html};

pub mod boilerplate;
pub mod scoring;

pub use boilerplate::strip_boilerplate;
pub use scoring::ScoreConfig;

const BLOCK_ELEMENTS: [&str; 11] = ["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre", "figcaption"];

/// Extract the readable body text of an article page, or `None` when nothing readable remains.
pub fn extract_main_text(html: &str) -> Option<String> {
    extract_main_text_with_config(html, &ScoreConfig::default())
}

/// [`extract_main_text`] with explicit scoring parameters.
pub fn extract_main_text_with_config(html: &str, config: &ScoreConfig) -> Option<String> {
    let cleaned = strip_boilerplate(html);
    let document = Html::parse_document(&cleaned);

    let root = scoring::top_candidate(&document, config).unwrap_or_else(|| document.root_element());
    let text = block_text(root);

    if text.is_empty() { None } else { Some(text) }
}

/// Text of the outermost block elements below `root`, one paragraph per block.
///
/// Falls back to the whitespace-normalized text of `root` when it has no block children.
fn block_text(root: ElementRef<'_>) -> String {
    let mut paragraphs = Vec::new();

    for element in root.descendants().filter_map(ElementRef::wrap) {
        if element.id() == root.id() || !is_block(element) {
            continue;
        }

        let nested = element
            .ancestors()
            .take_while(|node| node.id() != root.id())
            .filter_map(ElementRef::wrap)
            .any(is_block);
        if nested {
            continue;
        }

        let text = normalize(&element.text().collect::<String>());
        if !text.is_empty() {
            paragraphs.push(text);
        }
    }

    if paragraphs.is_empty() { normalize(&root.text().collect::<String>()) } else { paragraphs.join("\n\n") }
}

fn is_block(element: ElementRef<'_>) -> bool {
    BLOCK_ELEMENTS.contains(&element.value().name())
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
