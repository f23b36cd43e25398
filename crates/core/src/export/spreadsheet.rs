use std::path::Path;

use rust_xlsxwriter::{Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, FormatPattern, Workbook};

use crate::Result;
use crate::article::ArticleRecord;
use crate::config::{Column, SpreadsheetConfig};
use crate::export::Exporter;

const HEADER_FILL: u32 = 0x4F81BD;

/// Padding added to the widest cell of a column, in character units.
const WIDTH_PADDING: f64 = 2.0;

/// Single-sheet workbook with a styled header row.
#[derive(Debug, Clone)]
pub struct SpreadsheetExporter {
    config: SpreadsheetConfig,
}

impl SpreadsheetExporter {
    pub fn new(config: &SpreadsheetConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Width for `column`: widest of header and body cells plus padding, capped.
    pub fn column_width(&self, column: Column, records: &[ArticleRecord]) -> f64 {
        let widest = records
            .iter()
            .map(|record| cell_value(column, record).chars().count())
            .chain(std::iter::once(column.header().chars().count()))
            .max()
            .unwrap_or_default();

        (widest as f64 + WIDTH_PADDING).min(self.config.max_column_width)
    }
}

impl Exporter for SpreadsheetExporter {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn path(&self) -> &Path {
        &self.config.path
    }

    fn write(&self, records: &[ArticleRecord]) -> Result<()> {
        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_pattern(FormatPattern::Solid)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);
        let body_format = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::Top)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        let mut workbook = Workbook::new();
        let properties = DocProperties::new().set_creation_datetime(&ExcelDateTime::from_ymd(2000, 1, 1)?);
        workbook.set_properties(&properties);

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.config.sheet_name)?;

        for (col, column) in self.config.columns.iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, column.header(), &header_format)?;
            worksheet.set_column_width(col, self.column_width(*column, records))?;

            for (row, record) in records.iter().enumerate() {
                worksheet.write_string_with_format(row as u32 + 1, col, cell_value(*column, record), &body_format)?;
            }
        }

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        workbook.save(&self.config.path)?;
        Ok(())
    }
}

fn cell_value(column: Column, record: &ArticleRecord) -> &str {
    match column {
        Column::Id => record.id(),
        Column::Url => record.url(),
        Column::Title => record.title(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn records() -> Vec<ArticleRecord> {
        vec![
            ArticleRecord::new("123", "https://vnexpress.net/hello-123.html", "Hello").unwrap(),
            ArticleRecord::new("4567", "https://vnexpress.net/xin-chao-4567.html", "Xin chào thế giới").unwrap(),
        ]
    }

    fn config(path: PathBuf) -> SpreadsheetConfig {
        SpreadsheetConfig { path, ..Default::default() }
    }

    #[test]
    fn test_writes_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.xlsx");
        let exporter = SpreadsheetExporter::new(&config(path.clone()));

        assert!(exporter.export(&records()));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.xlsx");
        let exporter = SpreadsheetExporter::new(&config(path.clone()));

        assert!(exporter.export(&records()));
        let first = fs::read(&path).unwrap();
        assert!(exporter.export(&records()));
        assert_eq!(first, fs::read(&path).unwrap());
    }

    #[test]
    fn test_empty_records_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.xlsx");
        let exporter = SpreadsheetExporter::new(&config(path.clone()));

        assert!(!exporter.export(&[]));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SpreadsheetExporter::new(&config(dir.path().to_path_buf()));
        assert!(!exporter.export(&records()));
    }

    #[test]
    fn test_column_width() {
        let exporter = SpreadsheetExporter::new(&SpreadsheetConfig::default());
        let records = records();

        assert_eq!(exporter.column_width(Column::Id, &records), 6.0);
        assert_eq!(exporter.column_width(Column::Title, &records), 19.0);
    }

    #[test]
    fn test_column_width_capped() {
        let exporter = SpreadsheetExporter::new(&SpreadsheetConfig { max_column_width: 10.0, ..Default::default() });
        assert_eq!(exporter.column_width(Column::Url, &records()), 10.0);
    }
}
