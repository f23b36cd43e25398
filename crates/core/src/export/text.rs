use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::article::ArticleRecord;
use crate::config::{TextEncoding, TextReportConfig};
use crate::export::Exporter;

const BYTE_ORDER_MARK: &str = "\u{FEFF}";

/// Rule placed between two records. Not written after the last one.
pub const RECORD_SEPARATOR: &str = "\n================================================================================\n";

/// Human-readable plain-text report.
#[derive(Debug, Clone)]
pub struct TextExporter {
    path: PathBuf,
    encoding: TextEncoding,
}

impl TextExporter {
    pub fn new(config: &TextReportConfig) -> Self {
        Self { path: config.path.clone(), encoding: config.encoding }
    }
}

impl Exporter for TextExporter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &[ArticleRecord]) -> Result<()> {
        let mut output = String::new();
        if self.encoding == TextEncoding::Utf8Bom {
            output.push_str(BYTE_ORDER_MARK);
        }
        output.push_str(&render_report(records));

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, output)?;
        Ok(())
    }
}

/// Render every record as a numbered block.
///
/// ```text
/// Article 1
/// ---------
/// ID: 123
/// Title: Hello
/// URL: https://vnexpress.net/hello-123.html
///
/// Content:
/// Content not available
/// ```
pub fn render_report(records: &[ArticleRecord]) -> String {
    let blocks: Vec<String> = records.iter().enumerate().map(|(i, record)| render_record(i + 1, record)).collect();

    let mut report = blocks.join(RECORD_SEPARATOR);
    report.push('\n');
    report
}

fn render_record(number: usize, record: &ArticleRecord) -> String {
    let heading = format!("Article {}", number);
    let underline = "-".repeat(heading.len());

    format!(
        "{}\n{}\nID: {}\nTitle: {}\nURL: {}\n\nContent:\n{}",
        heading,
        underline,
        record.id(),
        record.title(),
        record.url(),
        record.content_or_marker()
    )
}
