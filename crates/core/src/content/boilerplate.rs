use std::sync::LazyLock;

use regex::Regex;

/// Elements that never carry article prose.
const BOILERPLATE_TAGS: [&str; 16] = [
    "script", "style", "noscript", "iframe", "svg", "canvas", "nav", "header", "footer", "aside", "form", "table",
    "button", "template", "select", "figure",
];

static COMMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(ads?|advert.*|advertisement|banner.*|branded-content|breadcrumbs?|comments?|comment-.*|disqus.*|menu.*|nav.*|newsletter|pagination|pager|popup|related.*|share.*|sidebar.*|social.*|sponsor.*|subscribe.*|tags?|box-tag)$",
    )
    .expect("valid negative pattern")
});

static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|main|post|story|text|detail)").expect("valid positive pattern")
});

static HIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").expect("valid hidden pattern")
});

/// Remove navigation, comments, tables, ads and other page chrome from `html`.
///
/// Falls back to the input when the rewriter rejects the markup.
pub fn strip_boilerplate(html: &str) -> String {
    let without_comments = COMMENTS.replace_all(html, "");
    remove_chrome(&without_comments)
}

/// Whether a class token or id names page chrome rather than content.
pub fn is_chrome_token(token: &str) -> bool {
    NEGATIVE.is_match(token) && !POSITIVE.is_match(token)
}

fn remove_chrome(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                let tag = el.tag_name().to_ascii_lowercase();
                if BOILERPLATE_TAGS.contains(&tag.as_str()) {
                    el.remove();
                    return Ok(());
                }

                if let Some(style) = el.get_attribute("style")
                    && HIDDEN.is_match(&style)
                {
                    el.remove();
                    return Ok(());
                }

                let id_is_chrome = el.get_attribute("id").is_some_and(|id| is_chrome_token(&id));
                let class_is_chrome = el
                    .get_attribute("class")
                    .is_some_and(|class| class.split_whitespace().any(is_chrome_token));
                if id_is_chrome || class_is_chrome {
                    el.remove();
                }

                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}
