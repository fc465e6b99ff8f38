//! Destinations for report tables.
//!
//! Rows arrive as typed [`ReportCell`]s. Text sinks render every cell;
//! the workbook sink keeps numbers as numeric cells.

use std::fmt;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use crate::error::CoreResult;

/// One value in a report row.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Text(String),
    Integer(u32),
    /// Rendered with a decimal point even when whole (`25.0`)
    Float(f64),
}

impl fmt::Display for ReportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportCell::Text(text) => f.write_str(text),
            ReportCell::Integer(value) => write!(f, "{value}"),
            ReportCell::Float(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<String> for ReportCell {
    fn from(text: String) -> Self {
        ReportCell::Text(text)
    }
}

impl From<&str> for ReportCell {
    fn from(text: &str) -> Self {
        ReportCell::Text(text.to_string())
    }
}

/// Receives one complete table: a header row followed by data rows.
pub trait ReportSink {
    fn write_table(&mut self, header: &[&str], rows: &[Vec<ReportCell>]) -> CoreResult<()>;
}

/// Writes a table as an RFC 4180 CSV file, replacing any previous file.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    path: PathBuf,
}

impl CsvReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for CsvReportSink {
    fn write_table(&mut self, header: &[&str], rows: &[Vec<ReportCell>]) -> CoreResult<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        writer.flush()?;
        log::debug!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

/// Writes a table as a single-sheet `.xlsx` workbook, replacing any
/// previous file. Numeric cells stay numbers; text cells, including error
/// markers, are written as strings.
#[derive(Debug, Clone)]
pub struct XlsxReportSink {
    path: PathBuf,
    sheet: String,
}

impl XlsxReportSink {
    /// `sheet` is the worksheet name, at most 31 characters.
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for XlsxReportSink {
    fn write_table(&mut self, header: &[&str], rows: &[Vec<ReportCell>]) -> CoreResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.sheet.as_str())?;

        for (col, title) in header.iter().enumerate() {
            worksheet.write_string(0, col as u16, *title)?;
        }
        for (index, row) in rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    ReportCell::Text(text) => worksheet.write_string(row_num, col, text.as_str())?,
                    ReportCell::Integer(value) => {
                        worksheet.write_number(row_num, col, f64::from(*value))?
                    }
                    ReportCell::Float(value) => worksheet.write_number(row_num, col, *value)?,
                };
            }
        }

        workbook.save(&self.path)?;
        log::debug!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

/// Writes the same table to several sinks. Every sink is attempted; the
/// first error is returned.
#[derive(Default)]
pub struct FanOutSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl FanOutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for FanOutSink {
    fn write_table(&mut self, header: &[&str], rows: &[Vec<ReportCell>]) -> CoreResult<()> {
        let results: Vec<CoreResult<()>> = self
            .sinks
            .iter_mut()
            .map(|sink| sink.write_table(header, rows))
            .collect();
        results.into_iter().collect()
    }
}

/// Keeps the last table written, rendered as text, for tests and
/// in-process consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryReportSink {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemoryReportSink {
    fn write_table(&mut self, header: &[&str], rows: &[Vec<ReportCell>]) -> CoreResult<()> {
        self.header = header.iter().map(|h| h.to_string()).collect();
        self.rows = rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_sink_quotes_fields() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("table.csv");
        let mut sink = CsvReportSink::new(&path);

        sink.write_table(
            &["Filename", "Extension"],
            &[vec!["a, b.mov".into(), ".mov".into()]],
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Filename,Extension\n\"a, b.mov\",.mov\n");
    }

    #[test]
    fn test_csv_sink_writes_header_for_empty_table() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("empty.csv");
        CsvReportSink::new(&path)
            .write_table(&["Filename", "Stage", "Reason"], &[])
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Filename,Stage,Reason\n"
        );
    }

    #[test]
    fn test_cells_render_like_reports() {
        assert_eq!(ReportCell::Float(25.0).to_string(), "25.0");
        assert_eq!(ReportCell::Float(29.97).to_string(), "29.97");
        assert_eq!(ReportCell::Integer(1080).to_string(), "1080");
        assert_eq!(ReportCell::from("Error").to_string(), "Error");
    }

    #[test]
    fn test_csv_sink_renders_typed_cells() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("copied.csv");
        CsvReportSink::new(&path)
            .write_table(
                &["Filename", "Frame Rate (fps)", "Width", "Height"],
                &[vec![
                    "a.mp4".into(),
                    ReportCell::Float(25.0),
                    ReportCell::Integer(1920),
                    "Error".into(),
                ]],
            )
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Filename,Frame Rate (fps),Width,Height\na.mp4,25.0,1920,Error\n"
        );
    }

    #[test]
    fn test_xlsx_sink_writes_workbook() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("Files_Copied.xlsx");
        let mut sink = XlsxReportSink::new(&path, "Copied Files Metadata");

        sink.write_table(
            &["Filename", "Duration (s)", "Width"],
            &[
                vec!["a.mp4".into(), ReportCell::Float(12.5), ReportCell::Integer(1920)],
                vec!["b.mp4".into(), "Error".into(), "Error".into()],
            ],
        )
        .unwrap();

        // xlsx files are zip containers
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_xlsx_sink_rejects_bad_sheet_name() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bad.xlsx");
        let mut sink = XlsxReportSink::new(&path, "a/b");

        let result = sink.write_table(&["Filename"], &[]);
        assert!(matches!(result, Err(crate::error::CoreError::Workbook(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_fan_out_attempts_every_sink() {
        let temp = tempfile::tempdir().unwrap();
        let written = temp.path().join("written.csv");
        let mut sink = FanOutSink::new()
            .with(CsvReportSink::new(temp.path().join("missing/dir/broken.csv")))
            .with(CsvReportSink::new(&written));
        assert_eq!(sink.len(), 2);

        let result = sink.write_table(&["Filename", "Extension"], &[]);
        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(&written).unwrap(),
            "Filename,Extension\n"
        );
    }
}
