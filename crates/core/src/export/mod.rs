//! Serializers consuming the finished record list.
//!
//! Each exporter overwrites its target file. An empty record list is refused
//! before the target is touched, so a previous report stays in place.

use std::path::Path;

use tracing::{error, info, warn};

use crate::Result;
use crate::article::ArticleRecord;

pub mod spreadsheet;
pub mod text;

pub use spreadsheet::SpreadsheetExporter;
pub use text::{RECORD_SEPARATOR, TextExporter, render_report};

/// One output target for a run.
pub trait Exporter {
    /// Short name used in logs and run reports.
    fn name(&self) -> &'static str;

    /// File the exporter writes.
    fn path(&self) -> &Path;

    /// Serialize `records` to [`Exporter::path`], overwriting it.
    fn write(&self, records: &[ArticleRecord]) -> Result<()>;

    /// Write `records`, logging the outcome. Never fails past this point.
    fn export(&self, records: &[ArticleRecord]) -> bool {
        if records.is_empty() {
            warn!(exporter = self.name(), "No articles to export");
            return false;
        }

        match self.write(records) {
            Ok(()) => {
                info!(exporter = self.name(), count = records.len(), path = %self.path().display(), "Exported articles");
                true
            }
            Err(e) => {
                error!(exporter = self.name(), path = %self.path().display(), error = %e, "Failed to export articles");
                false
            }
        }
    }
}
