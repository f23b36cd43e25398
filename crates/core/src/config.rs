//! Run configuration.
//!
//! A [`ScrapeConfig`] is built once per run (defaults, then an optional TOML
//! file, then command-line overrides), validated with [`ScrapeConfig::validate`]
//! and never mutated afterwards. Every section denies unknown keys so a typo in
//! the configuration file fails at load time instead of silently falling back to
//! a default deep inside extraction.
//!
//! ```toml
//! listing_url = "https://vnexpress.net/the-gioi"
//! fetch_content = true
//!
//! [selectors]
//! syntax = "xpath"
//! article_query = "//article[@data-offset or @data-swap]"
//!
//! [fetch]
//! max_retries = 5
//!
//! [export.text]
//! path = "report.txt"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::select;
use crate::{HeadlinerError, Result};

/// Listing page scraped when no override is given.
pub const DEFAULT_LISTING_URL: &str = "https://vnexpress.net/the-gioi";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Syntax used by the structural queries in [`SelectorConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySyntax {
    /// CSS selectors evaluated over an html5ever tree. Tolerates any markup.
    #[default]
    Css,
    /// XPath 1.0 expressions. Requires well-formed markup.
    #[serde(rename = "xpath")]
    XPath,
}

impl std::str::FromStr for QuerySyntax {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "xpath" => Ok(Self::XPath),
            _ => Err(format!("Invalid query syntax: {}. Valid options: css, xpath", s)),
        }
    }
}

/// Structural queries locating article teasers and their title links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "SelectorFile")]
pub struct SelectorConfig {
    pub syntax: QuerySyntax,
    /// Query matching one element per article teaser.
    pub article_query: String,
    /// Query, relative to a teaser, matching the anchor that carries title and href.
    pub title_query: String,
    /// Attribute of the title node holding the display title.
    pub title_attr: String,
    /// Attribute of the title node holding the article URL.
    pub url_attr: String,
}

impl SelectorConfig {
    /// Default queries for the given syntax.
    pub fn defaults_for(syntax: QuerySyntax) -> Self {
        let (article_query, title_query) = match syntax {
            QuerySyntax::Css => ("article[data-offset], article[data-swap]", "h3 > a[title]"),
            QuerySyntax::XPath => ("//article[@data-offset or @data-swap]", ".//h3/a[@title]"),
        };

        Self {
            syntax,
            article_query: article_query.to_string(),
            title_query: title_query.to_string(),
            title_attr: "title".to_string(),
            url_attr: "href".to_string(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self::defaults_for(QuerySyntax::Css)
    }
}

/// On-disk shape of `[selectors]`: queries fall back to the defaults of the chosen syntax.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SelectorFile {
    syntax: QuerySyntax,
    article_query: Option<String>,
    title_query: Option<String>,
    title_attr: Option<String>,
    url_attr: Option<String>,
}

impl From<SelectorFile> for SelectorConfig {
    fn from(file: SelectorFile) -> Self {
        let defaults = SelectorConfig::defaults_for(file.syntax);
        Self {
            syntax: file.syntax,
            article_query: file.article_query.unwrap_or(defaults.article_query),
            title_query: file.title_query.unwrap_or(defaults.title_query),
            title_attr: file.title_attr.unwrap_or(defaults.title_attr),
            url_attr: file.url_attr.unwrap_or(defaults.url_attr),
        }
    }
}

/// HTTP client configuration for listing and article fetches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempts per URL, including the first one.
    pub max_retries: u32,
    /// Backoff unit in milliseconds; attempt `n` (zero-indexed) waits `base * 2^n`.
    pub backoff_base_ms: u64,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        let headers = [
            ("User-Agent", DEFAULT_USER_AGENT),
            ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Connection", "keep-alive"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self { timeout_secs: 10, max_retries: 3, backoff_base_ms: 1000, headers }
    }
}

/// A spreadsheet column. Content is deliberately not a column: it only lives in the text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Column {
    #[serde(rename = "ID", alias = "id")]
    Id,
    #[serde(rename = "URL", alias = "url")]
    Url,
    #[serde(rename = "Title", alias = "title")]
    Title,
}

impl Column {
    /// Header cell text.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Url => "URL",
            Column::Title => "Title",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpreadsheetConfig {
    pub path: PathBuf,
    pub sheet_name: String,
    pub columns: Vec<Column>,
    /// Upper bound for auto-sized column widths, in character units.
    pub max_column_width: f64,
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("vnexpress_articles.xlsx"),
            sheet_name: "Articles".to_string(),
            columns: vec![Column::Id, Column::Url, Column::Title],
            max_column_width: 80.0,
        }
    }
}

/// Encoding of the plain-text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// UTF-8 prefixed with a byte-order mark.
    #[serde(rename = "utf-8-sig", alias = "utf8-sig")]
    Utf8Bom,
}

impl std::str::FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-8-sig" | "utf8-sig" => Ok(Self::Utf8Bom),
            _ => Err(format!("Unsupported encoding: {}. Valid options: utf-8, utf-8-sig", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextReportConfig {
    pub path: PathBuf,
    pub encoding: TextEncoding,
}

impl Default for TextReportConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("vnexpress_articles.txt"), encoding: TextEncoding::Utf8 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub spreadsheet: SpreadsheetConfig,
    pub text: TextReportConfig,
}

/// Complete configuration of one scraping run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeConfig {
    pub listing_url: String,
    /// Fetch every article page and extract its body text.
    pub fetch_content: bool,
    /// Skip teasers carrying advertisement class markers.
    pub filter_ads: bool,
    pub selectors: SelectorConfig,
    pub fetch: FetchConfig,
    pub export: ExportConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            fetch_content: false,
            filter_ads: true,
            selectors: SelectorConfig::default(),
            fetch: FetchConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(HeadlinerError::from)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HeadlinerError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The listing URL, parsed.
    pub fn listing_url(&self) -> Result<Url> {
        Url::parse(&self.listing_url).map_err(|e| HeadlinerError::InvalidUrl(format!("{}: {}", self.listing_url, e)))
    }

    /// Check every value once, up front.
    pub fn validate(&self) -> Result<()> {
        let url = self.listing_url()?;
        if !matches!(url.scheme(), "http" | "https" | "file") {
            return Err(HeadlinerError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                self.listing_url
            )));
        }

        let selectors = &self.selectors;
        select::validate_query(selectors.syntax, &selectors.article_query)?;
        select::validate_query(selectors.syntax, &selectors.title_query)?;
        if selectors.title_attr.trim().is_empty() || selectors.url_attr.trim().is_empty() {
            return Err(HeadlinerError::config("title_attr and url_attr must not be empty"));
        }

        if self.fetch.max_retries == 0 {
            return Err(HeadlinerError::config("max_retries must be at least 1"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(HeadlinerError::config("timeout_secs must be at least 1"));
        }
        for (name, value) in &self.fetch.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HeadlinerError::config(format!("invalid header name '{}': {}", name, e)))?;
            HeaderValue::from_str(value)
                .map_err(|e| HeadlinerError::config(format!("invalid value for header '{}': {}", name, e)))?;
        }

        let sheet = &self.export.spreadsheet;
        if sheet.columns.is_empty() {
            return Err(HeadlinerError::config("spreadsheet needs at least one column"));
        }
        for (i, column) in sheet.columns.iter().enumerate() {
            if sheet.columns[..i].contains(column) {
                return Err(HeadlinerError::config(format!("duplicate spreadsheet column '{}'", column.header())));
            }
        }
        validate_sheet_name(&sheet.sheet_name)?;
        if sheet.max_column_width < 1.0 {
            return Err(HeadlinerError::config("max_column_width must be at least 1"));
        }
        if sheet.path.as_os_str().is_empty() || self.export.text.path.as_os_str().is_empty() {
            return Err(HeadlinerError::config("output paths must not be empty"));
        }

        Ok(())
    }
}

/// Worksheet names Excel accepts: 1 to 31 characters, none of `[]:*?/\`,
/// no leading or trailing apostrophe, and not the reserved `History`.
fn validate_sheet_name(name: &str) -> Result<()> {
    const FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

    if name.trim().is_empty() {
        return Err(HeadlinerError::config("sheet_name must not be empty"));
    }
    if name.chars().count() > 31 {
        return Err(HeadlinerError::config(format!("sheet_name '{}' is longer than 31 characters", name)));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN.contains(c)) {
        return Err(HeadlinerError::config(format!("sheet_name '{}' contains forbidden character '{}'", name, c)));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(HeadlinerError::config(format!("sheet_name '{}' must not start or end with an apostrophe", name)));
    }
    if name.eq_ignore_ascii_case("history") {
        return Err(HeadlinerError::config("sheet_name 'History' is reserved"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScrapeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.timeout_secs, 10);
        assert!(config.fetch.headers["User-Agent"].contains("Mozilla"));
        assert_eq!(config.export.spreadsheet.columns, vec![Column::Id, Column::Url, Column::Title]);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = ScrapeConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScrapeConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = ScrapeConfig::from_toml_str(
            r#"
            listing_url = "https://example.com/news"
            fetch_content = true

            [fetch]
            max_retries = 5

            [export.spreadsheet]
            columns = ["Title", "URL"]
            "#,
        )
        .unwrap();

        assert_eq!(config.listing_url, "https://example.com/news");
        assert!(config.fetch_content);
        assert_eq!(config.fetch.max_retries, 5);
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.export.spreadsheet.columns, vec![Column::Title, Column::Url]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_xpath_syntax_takes_xpath_defaults() {
        let config = ScrapeConfig::from_toml_str("[selectors]\nsyntax = \"xpath\"\n").unwrap();
        assert_eq!(config.selectors, SelectorConfig::defaults_for(QuerySyntax::XPath));
        assert!(config.selectors.article_query.starts_with("//article"));
    }

    #[rstest]
    #[case("unknown_key = 1")]
    #[case("[fetch]\nretries = 3")]
    #[case("[selectors]\narticle = \"article\"")]
    #[case("[export.text]\nfile = \"x.txt\"")]
    fn test_unknown_keys_fail_fast(#[case] toml: &str) {
        assert!(matches!(ScrapeConfig::from_toml_str(toml), Err(HeadlinerError::Toml(_))));
    }

    #[rstest]
    #[case("listing_url = \"not a url\"")]
    #[case("listing_url = \"ftp://example.com/\"")]
    #[case("[fetch]\nmax_retries = 0")]
    #[case("[fetch]\ntimeout_secs = 0")]
    #[case("[selectors]\narticle_query = \"article[\"")]
    #[case("[selectors]\ntitle_attr = \"\"")]
    #[case("[export.spreadsheet]\ncolumns = []")]
    #[case("[export.spreadsheet]\ncolumns = [\"ID\", \"id\"]")]
    #[case("[fetch.headers]\n\"Bad Header\" = \"x\"")]
    #[case("[export.spreadsheet]\nsheet_name = \"  \"")]
    #[case("[export.spreadsheet]\nsheet_name = \"Tin the gioi hom nay va ngay mai 2024\"")]
    #[case("[export.spreadsheet]\nsheet_name = \"News/World\"")]
    #[case("[export.spreadsheet]\nsheet_name = \"[Draft]\"")]
    #[case("[export.spreadsheet]\nsheet_name = \"Q1: World\"")]
    #[case("[export.spreadsheet]\nsheet_name = \"'Quoted'\"")]
    #[case("[export.spreadsheet]\nsheet_name = \"history\"")]
    fn test_validation_rejects(#[case] toml: &str) {
        let config = ScrapeConfig::from_toml_str(toml).unwrap();
        assert!(config.validate().is_err(), "expected rejection for {toml}");
    }

    #[rstest]
    #[case("Articles")]
    #[case("Thế giới")]
    #[case("abcdefghijklmnopqrstuvwxyz01234")]
    #[case("Tin's world")]
    fn test_valid_sheet_names(#[case] name: &str) {
        assert!(validate_sheet_name(name).is_ok(), "expected {name} to be accepted");
    }

    #[test]
    fn test_text_encoding_parse() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("utf-8-sig".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8Bom);
        assert!("latin-1".parse::<TextEncoding>().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ScrapeConfig::load(Path::new("/nonexistent/headliner.toml"));
        assert!(matches!(result, Err(HeadlinerError::FileNotFound(_))));
    }

    #[test]
    fn test_backoff_base_duration() {
        let config = FetchConfig::default();
        assert_eq!(config.backoff_base(), Duration::from_secs(1));
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
