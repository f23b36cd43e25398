//! One scraping run, from the listing fetch to the exported reports.
//!
//! ```text
//! FetchListing -> Parse -> Assemble -> Export -> Done
//!       |           |          |
//!       +-----------+----------+--> Aborted
//! ```
//!
//! The run aborts when the listing page cannot be fetched or when no record
//! survives assembly. Everything else is recovered inside the step that hit it
//! and only shows up in the [`RunReport`].

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::Result;
use crate::assemble::Assembler;
use crate::config::ScrapeConfig;
use crate::export::{Exporter, SpreadsheetExporter, TextExporter};
use crate::fetch::{FetchFailure, Fetcher, HttpTransport, Sleep, ThreadSleep, Transport};
use crate::select::{NodeSelector, select_candidates, selector_for};

/// Step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    FetchListing,
    Parse,
    Assemble,
    Export,
    Done,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::FetchListing => "fetch-listing",
            RunState::Parse => "parse",
            RunState::Assemble => "assemble",
            RunState::Export => "export",
            RunState::Done => "done",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why a run stopped before exporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The listing page could not be fetched after every retry.
    ListingUnavailable(FetchFailure),
    /// The listing yielded no candidate elements.
    NoCandidates,
    /// Candidates were found but none produced a valid record.
    NoRecords,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::ListingUnavailable(failure) => write!(f, "listing page unavailable: {}", failure),
            AbortReason::NoCandidates => f.write_str("no article elements found on the listing page"),
            AbortReason::NoRecords => f.write_str("no valid articles found"),
        }
    }
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every exporter succeeded.
    Success,
    /// Some, but not all, exporters succeeded.
    Partial,
    /// Records were assembled but no exporter succeeded.
    Failed,
    /// The run stopped before exporting.
    Aborted,
}

/// Result of one exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub exporter: &'static str,
    pub path: PathBuf,
    pub success: bool,
}

/// What a run did, for the caller to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Terminal state: [`RunState::Done`] or [`RunState::Aborted`].
    pub state: RunState,
    pub abort_reason: Option<AbortReason>,
    pub candidates: usize,
    pub records: usize,
    pub exports: Vec<ExportResult>,
}

impl RunReport {
    fn new() -> Self {
        Self { state: RunState::FetchListing, abort_reason: None, candidates: 0, records: 0, exports: Vec::new() }
    }

    fn enter(&mut self, state: RunState) {
        debug!(from = %self.state, to = %state, "Run state transition");
        self.state = state;
    }

    fn abort(mut self, reason: AbortReason) -> Self {
        match &reason {
            AbortReason::ListingUnavailable(_) => error!(reason = %reason, "Run aborted"),
            AbortReason::NoCandidates | AbortReason::NoRecords => warn!(reason = %reason, "Run aborted"),
        }
        self.enter(RunState::Aborted);
        self.abort_reason = Some(reason);
        self
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.state == RunState::Aborted {
            return RunOutcome::Aborted;
        }

        let succeeded = self.exports.iter().filter(|e| e.success).count();
        if succeeded == self.exports.len() && succeeded > 0 {
            RunOutcome::Success
        } else if succeeded > 0 {
            RunOutcome::Partial
        } else {
            RunOutcome::Failed
        }
    }

    /// Whether at least one output file was written.
    pub fn produced_output(&self) -> bool {
        self.exports.iter().any(|e| e.success)
    }
}

/// Runs the fetch, select, assemble and export steps for one configuration.
pub struct Scraper<T = HttpTransport, S = ThreadSleep> {
    config: ScrapeConfig,
    listing_url: Url,
    fetcher: Fetcher<T, S>,
    selector: Box<dyn NodeSelector>,
    exporters: Vec<Box<dyn Exporter>>,
}

impl Scraper {
    /// Build an HTTP scraper from `config`, validating it through [`Scraper::with_fetcher`].
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config.fetch)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<T: Transport, S: Sleep> Scraper<T, S> {
    /// Build a scraper around an existing fetcher, validating `config` first.
    pub fn with_fetcher(config: ScrapeConfig, fetcher: Fetcher<T, S>) -> Result<Self> {
        config.validate()?;
        let listing_url = config.listing_url()?;
        let selector = selector_for(&config.selectors)?;
        let exporters: Vec<Box<dyn Exporter>> = vec![
            Box::new(SpreadsheetExporter::new(&config.export.spreadsheet)),
            Box::new(TextExporter::new(&config.export.text)),
        ];

        Ok(Self { config, listing_url, fetcher, selector, exporters })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Execute one run. Never fails: every problem ends up in the report.
    pub fn run(&self) -> RunReport {
        let mut report = RunReport::new();
        info!(url = %self.listing_url, content = self.config.fetch_content, "Starting scraper");

        let markup = match self.fetcher.fetch(self.listing_url.as_str()) {
            Ok(markup) => markup,
            Err(failure) => return report.abort(AbortReason::ListingUnavailable(failure)),
        };

        report.enter(RunState::Parse);
        let candidates = select_candidates(self.selector.as_ref(), &markup);
        report.candidates = candidates.len();
        if candidates.is_empty() {
            return report.abort(AbortReason::NoCandidates);
        }

        report.enter(RunState::Assemble);
        let records = Assembler::new(&self.fetcher, self.listing_url.clone())
            .filter_ads(self.config.filter_ads)
            .assemble(&candidates, &self.config.selectors, self.config.fetch_content);
        report.records = records.len();
        info!(count = records.len(), "Found valid articles");
        if records.is_empty() {
            return report.abort(AbortReason::NoRecords);
        }

        report.enter(RunState::Export);
        for exporter in &self.exporters {
            let success = exporter.export(&records);
            report.exports.push(ExportResult { exporter: exporter.name(), path: exporter.path().to_path_buf(), success });
        }

        match report.outcome() {
            RunOutcome::Success => info!(records = report.records, "Run completed successfully"),
            RunOutcome::Partial => {
                let failed: Vec<_> = report.exports.iter().filter(|e| !e.success).map(|e| e.exporter).collect();
                warn!(records = report.records, ?failed, "Run completed with partial export")
            }
            RunOutcome::Failed | RunOutcome::Aborted => error!(records = report.records, "All exports failed"),
        }

        report.enter(RunState::Done);
        report
    }
}

/// Validate `config`, run it over HTTP and return the report.
pub fn run(config: ScrapeConfig) -> Result<RunReport> {
    Ok(Scraper::new(config)?.run())
}
