//! Structural selection of article teasers on a listing page.
//!
//! The query language is swappable: [`CssSelector`] evaluates CSS selectors
//! over an html5ever tree and accepts any markup a browser would, while
//! `XPathSelector` (feature `xpath`) evaluates XPath 1.0 over a strict XML
//! tree. Both implement [`NodeSelector`], which parses the markup once and
//! returns one [`Candidate`] per teaser with its title node already looked up.

use std::collections::BTreeMap;

use tracing::{debug, error, info};

use crate::config::{QuerySyntax, SelectorConfig};
use crate::{HeadlinerError, Result};

pub mod css;
#[cfg(feature = "xpath")]
pub mod xpath;

pub use css::CssSelector;
#[cfg(feature = "xpath")]
pub use xpath::XPathSelector;

/// Class tokens marking advertisement tiles.
pub const AD_MARKERS: [&str; 5] = ["banner", "ads", "advertisement", "sponsor", "branded-content"];

/// The anchor inside a teaser that carries the title and link attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleNode {
    attributes: BTreeMap<String, String>,
}

impl TitleNode {
    pub fn new(attributes: BTreeMap<String, String>) -> Self {
        Self { attributes }
    }

    /// Value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One element matched by the article query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// Zero-based position in document order.
    pub position: usize,
    /// Class tokens of the element and all of its descendants.
    pub class_names: Vec<String>,
    /// Result of the title query relative to this element.
    pub title_node: Option<TitleNode>,
}

impl Candidate {
    /// Whether any class token of the teaser is an advertisement marker.
    pub fn is_advertisement(&self) -> bool {
        self.class_names.iter().any(|class| AD_MARKERS.contains(&class.as_str()))
    }
}

/// Query backend over one parsed page.
pub trait NodeSelector {
    /// Parse `markup` once and return every article candidate in document order.
    ///
    /// Fails only when the markup cannot be turned into a tree at all.
    fn select_candidates(&self, markup: &str) -> Result<Vec<Candidate>>;
}

/// Build the backend matching the configured syntax.
pub fn selector_for(config: &SelectorConfig) -> Result<Box<dyn NodeSelector>> {
    match config.syntax {
        QuerySyntax::Css => Ok(Box::new(CssSelector::new(config)?)),
        #[cfg(feature = "xpath")]
        QuerySyntax::XPath => Ok(Box::new(XPathSelector::new(config)?)),
        #[cfg(not(feature = "xpath"))]
        QuerySyntax::XPath => Err(HeadlinerError::config("XPath queries require the `xpath` feature")),
    }
}

/// Check that a query compiles in the given syntax.
pub fn validate_query(syntax: QuerySyntax, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(HeadlinerError::invalid_query(query, "query is empty"));
    }
    match syntax {
        QuerySyntax::Css => css::compile(query).map(|_| ()),
        #[cfg(feature = "xpath")]
        QuerySyntax::XPath => xpath::compile(query).map(|_| ()),
        #[cfg(not(feature = "xpath"))]
        QuerySyntax::XPath => Err(HeadlinerError::config("XPath queries require the `xpath` feature")),
    }
}

/// Page-level selection: a parse failure is logged and yields no candidates.
pub fn select_candidates(selector: &dyn NodeSelector, markup: &str) -> Vec<Candidate> {
    match selector.select_candidates(markup) {
        Ok(candidates) => {
            let without_title = candidates.iter().filter(|c| c.title_node.is_none()).count();
            info!(count = candidates.len(), "Found potential article elements");
            if without_title > 0 {
                debug!(without_title, "Some candidates have no title node");
            }
            candidates
        }
        Err(e) => {
            error!(error = %e, "Error parsing listing markup; continuing with zero candidates");
            Vec::new()
        }
    }
}
