pub mod article;
pub mod assemble;
pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod fetch;
pub mod identifier;
pub mod pipeline;
pub mod select;

pub use article::{ArticleContent, ArticleRecord, CONTENT_UNAVAILABLE};
pub use assemble::{Assembler, SkipReason};
pub use config::{
    Column, ExportConfig, FetchConfig, QuerySyntax, ScrapeConfig, SelectorConfig, SpreadsheetConfig, TextEncoding,
    TextReportConfig,
};
pub use content::{extract_main_text, extract_main_text_with_config, strip_boilerplate};
#[doc(hidden)]
pub use content::scoring::{ScoreConfig, base_tag_score, class_id_weight, link_density, top_candidate};
pub use error::{HeadlinerError, Result};
pub use export::{Exporter, SpreadsheetExporter, TextExporter, render_report};
pub use fetch::{FetchFailure, Fetcher, HttpTransport, Sleep, ThreadSleep, Transport, fetch_file};
pub use identifier::extract_id;
pub use pipeline::{AbortReason, ExportResult, RunOutcome, RunReport, RunState, Scraper, run};
pub use select::{Candidate, CssSelector, NodeSelector, TitleNode, select_candidates, selector_for};
#[cfg(feature = "xpath")]
pub use select::XPathSelector;
