//! Workbook sink backed by umya-spreadsheet.

use super::{unique_sheet_name, ExportSink};
use crate::directory::Dataset;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use umya_spreadsheet::{reader, writer, Spreadsheet};

/// Writes each dataset as a new sheet of one workbook file.
///
/// The file is created on the first save and reopened on every later one, so
/// sheets from earlier runs are kept.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Spreadsheet> {
        if self.path.exists() {
            debug!("Opening workbook {}", self.path.display());
            return reader::xlsx::read(&self.path)
                .with_context(|| format!("Failed to read workbook: {}", self.path.display()));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        debug!("Creating workbook {}", self.path.display());
        Ok(umya_spreadsheet::new_file_empty_worksheet())
    }
}

impl ExportSink for XlsxSink {
    fn save(&mut self, sheet_label: &str, dataset: &Dataset) -> Result<String> {
        let mut book = self.open()?;

        let existing: Vec<String> =
            book.get_sheet_collection().iter().map(|s| s.get_name().to_string()).collect();
        let name = unique_sheet_name(sheet_label, existing.iter().map(String::as_str));

        let sheet = book
            .new_sheet(&name)
            .map_err(|e| anyhow!("Failed to add sheet '{}': {}", name, e))?;

        for (row, values) in (1u32..).zip(dataset.rows()) {
            for (col, value) in (1u32..).zip(values) {
                sheet.get_cell_mut((col, row)).set_value(value);
            }
        }

        writer::xlsx::write(&book, &self.path)
            .with_context(|| format!("Failed to write workbook: {}", self.path.display()))?;

        info!("Saved {} records for {} to sheet '{}'", dataset.len(), dataset.region, name);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Record;
    use tempfile::TempDir;

    fn make_test_dataset() -> Dataset {
        let mut dataset = Dataset::new("Germany");
        dataset.push(Record {
            name: "Night Shift".to_string(),
            email: Some("hello@nightshift.example".to_string()),
            phone: Some("5551234567".to_string()),
            ..Record::default()
        });
        dataset.push(Record::named("Quiet Collective"));
        dataset
    }

    #[test]
    fn test_save_creates_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("promoters.xlsx");
        let mut sink = XlsxSink::new(&path);

        let name = sink.save("Germany (Mar-07)", &make_test_dataset()).unwrap();
        assert_eq!(name, "Germany (Mar-07)");
        assert!(path.exists());

        let book = reader::xlsx::read(&path).unwrap();
        assert_eq!(book.get_sheet_count(), 1);

        let sheet = book.get_sheet_by_name("Germany (Mar-07)").unwrap();
        assert_eq!(sheet.get_value((1, 1)), "Name");
        assert_eq!(sheet.get_value((8, 1)), "Twitter");
        assert_eq!(sheet.get_value((1, 2)), "Night Shift");
        assert_eq!(sheet.get_value((2, 2)), "hello@nightshift.example");
        assert_eq!(sheet.get_value((3, 2)), "N/A");
        assert_eq!(sheet.get_value((7, 2)), "5551234567");
        assert_eq!(sheet.get_value((1, 3)), "Quiet Collective");
        assert_eq!(sheet.get_value((2, 3)), "N/A");
    }

    #[test]
    fn test_save_appends_and_keeps_existing_sheets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("promoters.xlsx");
        let mut sink = XlsxSink::new(&path);

        sink.save("Germany (Mar-07)", &make_test_dataset()).unwrap();
        let second = sink.save("France (Mar-07)", &Dataset::new("France")).unwrap();
        assert_eq!(second, "France (Mar-07)");

        let book = reader::xlsx::read(&path).unwrap();
        assert_eq!(book.get_sheet_count(), 2);

        let first = book.get_sheet_by_name("Germany (Mar-07)").unwrap();
        assert_eq!(first.get_value((1, 2)), "Night Shift");

        // An empty dataset still gets a sheet with the header row.
        let empty = book.get_sheet_by_name("France (Mar-07)").unwrap();
        assert_eq!(empty.get_value((1, 1)), "Name");
        assert_eq!(empty.get_value((1, 2)), "");
    }

    #[test]
    fn test_save_same_label_gets_suffix() {
        let dir = TempDir::new().unwrap();
        let mut sink = XlsxSink::new(dir.path().join("promoters.xlsx"));

        let first = sink.save("Germany (Mar-07)", &make_test_dataset()).unwrap();
        let second = sink.save("Germany (Mar-07)", &make_test_dataset()).unwrap();

        assert_eq!(first, "Germany (Mar-07)");
        assert_eq!(second, "Germany (Mar-07) (2)");

        let book = reader::xlsx::read(sink.path()).unwrap();
        assert_eq!(book.get_sheet_count(), 2);
    }
}
