use std::collections::BTreeMap;

use sxd_document::dom::Element;
use sxd_document::parser;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};

use crate::config::SelectorConfig;
use crate::select::{Candidate, NodeSelector, TitleNode};
use crate::{HeadlinerError, Result};

/// Compile an XPath expression.
pub fn compile(query: &str) -> Result<XPath> {
    Factory::new()
        .build(query)
        .map_err(|e| HeadlinerError::invalid_query(query, e))?
        .ok_or_else(|| HeadlinerError::invalid_query(query, "expression is empty"))
}

/// XPath 1.0 backend.
///
/// The markup must be well-formed XML (XHTML or a cleaned page); anything else
/// fails in [`NodeSelector::select_candidates`] with [`HeadlinerError::MarkupParse`].
pub struct XPathSelector {
    article: XPath,
    title: XPath,
    class_attrs: XPath,
}

impl XPathSelector {
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            article: compile(&config.article_query)?,
            title: compile(&config.title_query)?,
            class_attrs: compile("descendant-or-self::*/@class")?,
        })
    }

    /// First element, in document order, matched by the title query evaluated from `candidate`.
    pub fn select_title_node<'d>(&self, context: &Context<'d>, candidate: Element<'d>) -> Result<Option<TitleNode>> {
        let node = match self.title.evaluate(context, candidate)? {
            Value::Nodeset(nodeset) => nodeset.document_order_first(),
            _ => None,
        };

        Ok(match node {
            Some(Node::Element(element)) => {
                let attributes = element
                    .attributes()
                    .iter()
                    .map(|attr| (attr.name().local_part().to_string(), attr.value().to_string()))
                    .collect::<BTreeMap<_, _>>();
                Some(TitleNode::new(attributes))
            }
            _ => None,
        })
    }

    fn class_names<'d>(&self, context: &Context<'d>, candidate: Element<'d>) -> Result<Vec<String>> {
        let names = match self.class_attrs.evaluate(context, candidate)? {
            Value::Nodeset(nodeset) => nodeset
                .document_order()
                .iter()
                .flat_map(|node| node.string_value().split_whitespace().map(str::to_string).collect::<Vec<_>>())
                .collect(),
            _ => Vec::new(),
        };
        Ok(names)
    }
}

impl NodeSelector for XPathSelector {
    fn select_candidates(&self, markup: &str) -> Result<Vec<Candidate>> {
        let package = parser::parse(markup).map_err(|e| HeadlinerError::MarkupParse(format!("{}", e)))?;
        let document = package.as_document();
        let context = Context::new();

        let elements: Vec<Element<'_>> = match self.article.evaluate(&context, document.root())? {
            Value::Nodeset(nodeset) => nodeset
                .document_order()
                .into_iter()
                .filter_map(|node| match node {
                    Node::Element(element) => Some(element),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut candidates = Vec::with_capacity(elements.len());
        for (position, element) in elements.into_iter().enumerate() {
            candidates.push(Candidate {
                position,
                class_names: self.class_names(&context, element)?,
                title_node: self.select_title_node(&context, element)?,
            });
        }

        Ok(candidates)
    }
}
