//! Turning selected candidates into validated article records.
//!
//! For each candidate, in document order, the [`Assembler`]:
//!
//! 1. skips advertisement tiles (when ad filtering is on),
//! 2. reads title and href from the title node, skipping empty ones,
//! 3. resolves the href against the listing URL, skipping links whose scheme
//!    the listing does not allow, and derives the id, skipping links without one,
//! 4. drops ids already seen in this run (first occurrence wins),
//! 5. optionally fetches the article page and extracts its body text.
//!
//! Skips are expected and logged at debug level. An error on one candidate is
//! logged and drops only that candidate.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::article::{ArticleContent, ArticleRecord};
use crate::config::SelectorConfig;
use crate::content::{ScoreConfig, extract_main_text_with_config};
use crate::fetch::{Fetcher, HttpTransport, Sleep, ThreadSleep, Transport};
use crate::identifier::extract_id;
use crate::select::Candidate;
use crate::{HeadlinerError, Result};

/// Why a candidate produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Advertisement,
    MissingTitleNode,
    MissingTitleOrUrl,
    DisallowedScheme,
    NoArticleId,
    DuplicateId,
}

/// Builds [`ArticleRecord`]s from candidates, fetching bodies through a shared [`Fetcher`].
pub struct Assembler<'a, T = HttpTransport, S = ThreadSleep> {
    fetcher: &'a Fetcher<T, S>,
    base_url: Url,
    filter_ads: bool,
    score_config: ScoreConfig,
}

impl<'a, T: Transport, S: Sleep> Assembler<'a, T, S> {
    /// `base_url` is the listing page URL; relative hrefs resolve against it.
    pub fn new(fetcher: &'a Fetcher<T, S>, base_url: Url) -> Self {
        Self { fetcher, base_url, filter_ads: true, score_config: ScoreConfig::default() }
    }

    /// Enable or disable the advertisement class-marker filter.
    pub fn filter_ads(mut self, filter_ads: bool) -> Self {
        self.filter_ads = filter_ads;
        self
    }

    /// Assemble records from `candidates`.
    ///
    /// The output is never longer than the input, ids are pairwise distinct and
    /// records keep the order in which their ids were first seen.
    pub fn assemble(
        &self, candidates: &[Candidate], config: &SelectorConfig, fetch_content: bool,
    ) -> Vec<ArticleRecord> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for candidate in candidates {
            match self.assemble_one(candidate, config, fetch_content, &seen) {
                Ok(Ok(record)) => {
                    info!(id = record.id(), title = record.title(), "Successfully parsed article");
                    seen.insert(record.id().to_string());
                    records.push(record);
                }
                Ok(Err(reason)) => {
                    debug!(position = candidate.position, ?reason, "Skipping candidate");
                }
                Err(e) => {
                    error!(position = candidate.position, error = %e, "Error parsing article; skipping candidate");
                }
            }
        }

        info!(candidates = candidates.len(), records = records.len(), "Assembled articles");
        records
    }

    fn assemble_one(
        &self, candidate: &Candidate, config: &SelectorConfig, fetch_content: bool, seen: &HashSet<String>,
    ) -> Result<std::result::Result<ArticleRecord, SkipReason>> {
        if self.filter_ads && candidate.is_advertisement() {
            return Ok(Err(SkipReason::Advertisement));
        }

        let Some(title_node) = &candidate.title_node else {
            return Ok(Err(SkipReason::MissingTitleNode));
        };

        let title = title_node.attr(&config.title_attr).unwrap_or_default().trim();
        let href = title_node.attr(&config.url_attr).unwrap_or_default().trim();
        if title.is_empty() || href.is_empty() {
            return Ok(Err(SkipReason::MissingTitleOrUrl));
        }

        let url = self
            .base_url
            .join(href)
            .map_err(|e| HeadlinerError::InvalidUrl(format!("cannot resolve '{}': {}", href, e)))?;

        if !scheme_allowed(&self.base_url, &url) {
            debug!(url = %url, listing_scheme = self.base_url.scheme(), "Article URL scheme not allowed");
            return Ok(Err(SkipReason::DisallowedScheme));
        }

        let Some(id) = extract_id(url.as_str()) else {
            debug!(url = %url, "No valid article ID found for URL");
            return Ok(Err(SkipReason::NoArticleId));
        };

        if seen.contains(&id) {
            return Ok(Err(SkipReason::DuplicateId));
        }

        let record = ArticleRecord::new(id, url.as_str(), title)
            .ok_or_else(|| HeadlinerError::InvalidUrl(format!("empty field in record for {}", url)))?;

        if fetch_content {
            let content = self.fetch_content(record.url());
            return Ok(Ok(record.with_content(content)));
        }

        Ok(Ok(record))
    }

    /// Fetch an article page and extract its body, falling back to the unavailable marker.
    fn fetch_content(&self, url: &str) -> ArticleContent {
        match self.fetcher.fetch(url) {
            Ok(html) => {
                let content = ArticleContent::from_extracted(extract_main_text_with_config(&html, &self.score_config));
                if content == ArticleContent::Unavailable {
                    warn!(%url, "No readable content extracted");
                }
                content
            }
            Err(failure) => {
                warn!(%url, error = %failure, "Article page unavailable");
                ArticleContent::Unavailable
            }
        }
    }
}

/// Web listings only link to web pages; local files are reachable only from a local listing.
fn scheme_allowed(listing: &Url, article: &Url) -> bool {
    match article.scheme() {
        "http" | "https" => true,
        "file" => listing.scheme() == "file",
        _ => false,
    }
}
