use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Configuration for container scoring
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Paragraphs shorter than this (in characters) do not vote
    pub min_paragraph_chars: usize,
    /// Weight for positive class/ID patterns
    pub positive_weight: f64,
    /// Weight for negative class/ID patterns
    pub negative_weight: f64,
    /// Maximum density points from paragraph length
    pub max_char_density_score: f64,
    /// Characters per density point
    pub chars_per_point: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            min_paragraph_chars: 25,
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            chars_per_point: 100,
        }
    }
}

static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|main|page|post|text|blog|story|detail)")
        .expect("valid positive pattern")
});

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup)",
    )
    .expect("valid negative pattern")
});

static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p, pre").expect("valid paragraph selector"));

static LINKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid link selector"));

/// Base score of a container by tag name.
pub fn base_tag_score(element: ElementRef<'_>) -> f64 {
    match element.value().name() {
        "article" | "main" => 10.0,
        "section" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "form" | "ol" | "ul" | "dl" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

/// Positive weight when the id or a class token looks like content, negative when it looks like chrome.
pub fn class_id_weight(element: ElementRef<'_>, config: &ScoreConfig) -> f64 {
    let tokens = element.value().id().into_iter().chain(element.value().classes());

    for token in tokens {
        if POSITIVE.is_match(token) {
            return config.positive_weight;
        }
        if NEGATIVE.is_match(token) {
            return config.negative_weight;
        }
    }

    0.0
}

/// Share of the element's text that sits inside links, from 0.0 to 1.0.
pub fn link_density(element: ElementRef<'_>) -> f64 {
    let text_length = element.text().map(|t| t.chars().count()).sum::<usize>();
    if text_length == 0 {
        return 0.0;
    }

    let link_length = element
        .select(&LINKS)
        .map(|link| link.text().map(|t| t.chars().count()).sum::<usize>())
        .sum::<usize>();

    link_length as f64 / text_length as f64
}

/// Vote cast by one paragraph: one point, plus one per comma, plus length density.
pub fn paragraph_score(text: &str, config: &ScoreConfig) -> f64 {
    let commas = text.matches(',').count() as f64;
    let density = ((text.chars().count() / config.chars_per_point) as f64).min(config.max_char_density_score);
    1.0 + commas + density
}

/// Container holding the main body text, if any paragraph votes.
///
/// Every paragraph long enough gives its score to its parent and half of it to
/// its grandparent. Containers start from their tag and class/id weights and end
/// scaled by `1 - link_density`.
pub fn top_candidate<'a>(document: &'a Html, config: &ScoreConfig) -> Option<ElementRef<'a>> {
    let mut scores = HashMap::new();

    for paragraph in document.select(&PARAGRAPHS) {
        let text = paragraph.text().collect::<String>();
        let text = text.trim();
        if text.chars().count() < config.min_paragraph_chars {
            continue;
        }

        let vote = paragraph_score(text, config);
        let ancestors = paragraph.ancestors().filter_map(ElementRef::wrap).take(2);
        for (level, ancestor) in ancestors.enumerate() {
            let entry = scores
                .entry(ancestor.id())
                .or_insert_with(|| (ancestor, base_tag_score(ancestor) + class_id_weight(ancestor, config)));
            entry.1 += if level == 0 { vote } else { vote / 2.0 };
        }
    }

    scores
        .into_values()
        .map(|(element, score)| (element, score * (1.0 - link_density(element))))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(element, _)| element)
}
