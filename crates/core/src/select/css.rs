use scraper::{ElementRef, Html, Selector};

use crate::config::SelectorConfig;
use crate::select::{Candidate, NodeSelector, TitleNode};
use crate::{HeadlinerError, Result};

/// Compile a CSS selector.
pub fn compile(query: &str) -> Result<Selector> {
    Selector::parse(query).map_err(|e| HeadlinerError::invalid_query(query, e))
}

/// CSS selector backend.
///
/// html5ever repairs any markup, so [`NodeSelector::select_candidates`] never fails here.
#[derive(Debug, Clone)]
pub struct CssSelector {
    article: Selector,
    title: Selector,
}

impl CssSelector {
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        Ok(Self { article: compile(&config.article_query)?, title: compile(&config.title_query)? })
    }

    /// First element below `candidate` matching the title query.
    pub fn select_title_node(&self, candidate: ElementRef<'_>) -> Option<TitleNode> {
        candidate.select(&self.title).next().map(|node| {
            let attributes = node.value().attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect();
            TitleNode::new(attributes)
        })
    }
}

impl NodeSelector for CssSelector {
    fn select_candidates(&self, markup: &str) -> Result<Vec<Candidate>> {
        let document = Html::parse_document(markup);

        let candidates = document
            .select(&self.article)
            .enumerate()
            .map(|(position, element)| Candidate {
                position,
                class_names: class_names(element),
                title_node: self.select_title_node(element),
            })
            .collect();

        Ok(candidates)
    }
}

fn class_names(element: ElementRef<'_>) -> Vec<String> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .flat_map(|el| el.value().classes().map(str::to_string).collect::<Vec<_>>())
        .collect()
}
