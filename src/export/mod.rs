//! Export of per-region datasets as dated workbook sheets.

mod xlsx;

pub use xlsx::XlsxSink;

use crate::directory::Dataset;
use anyhow::Result;
use chrono::NaiveDate;

/// Excel's limit on sheet name length, in characters.
pub const MAX_SHEET_NAME: usize = 31;

const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Destination for finished region datasets.
pub trait ExportSink {
    /// Persists `dataset` under a sheet derived from `sheet_label` and returns
    /// the sheet name actually written.
    fn save(&mut self, sheet_label: &str, dataset: &Dataset) -> Result<String>;
}

/// Builds the sheet label `"<Region> (<Mon>-<dd>)"`.
///
/// Characters Excel rejects in sheet names become `_`, and the region part is
/// shortened so the whole label stays within [`MAX_SHEET_NAME`].
pub fn sheet_label(region: &str, date: NaiveDate) -> String {
    let suffix = format!(" ({})", date.format("%b-%d"));
    let region = sanitize(region);
    let region = if region.is_empty() { "Region".to_string() } else { region };

    with_suffix(&region, &suffix)
}

/// Picks a name not in `existing` (compared case-insensitively, as Excel does),
/// adding ` (2)`, ` (3)`, ... when `label` is taken.
pub fn unique_sheet_name<'a>(label: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<String> = existing.into_iter().map(str::to_lowercase).collect();
    let is_free = |name: &str| !taken.contains(&name.to_lowercase());

    let label = with_suffix(label, "");
    if is_free(&label) {
        return label;
    }

    let mut n = 2;
    loop {
        let candidate = with_suffix(&label, &format!(" ({})", n));
        if is_free(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn sanitize(name: &str) -> String {
    name.trim().chars().map(|c| if FORBIDDEN.contains(&c) { '_' } else { c }).collect()
}

/// Appends `suffix`, truncating `base` so the result fits the sheet name limit.
fn with_suffix(base: &str, suffix: &str) -> String {
    let room = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
    let base: String = base.chars().take(room).collect();
    format!("{}{}", base.trim_end(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn test_sheet_label_format() {
        assert_eq!(sheet_label("Germany", date()), "Germany (Mar-07)");
        assert_eq!(sheet_label("  Spain ", date()), "Spain (Mar-07)");
    }

    #[test]
    fn test_sheet_label_sanitizes() {
        assert_eq!(sheet_label("Bosnia/Herzegovina", date()), "Bosnia_Herzegovina (Mar-07)");
        assert_eq!(sheet_label("[a]:*?\\", date()), "_a_____ (Mar-07)");
        assert_eq!(sheet_label("", date()), "Region (Mar-07)");
    }

    #[test]
    fn test_sheet_label_truncates() {
        let label = sheet_label("United Kingdom of Great Britain", date());
        assert_eq!(label, "United Kingdom of Grea (Mar-07)");
        assert_eq!(label.chars().count(), MAX_SHEET_NAME);

        // Trailing whitespace at the cut is dropped
        let label = sheet_label("Saint Vincent and the Grenadines", date());
        assert_eq!(label, "Saint Vincent and the (Mar-07)");
    }

    #[test]
    fn test_unique_sheet_name() {
        let existing = ["Germany (Mar-07)", "Sheet1"];
        assert_eq!(unique_sheet_name("France (Mar-07)", existing), "France (Mar-07)");
        assert_eq!(unique_sheet_name("Germany (Mar-07)", existing), "Germany (Mar-07) (2)");
        assert_eq!(unique_sheet_name("GERMANY (MAR-07)", existing), "GERMANY (MAR-07) (2)");

        let existing = ["Germany (Mar-07)", "Germany (Mar-07) (2)"];
        assert_eq!(unique_sheet_name("Germany (Mar-07)", existing), "Germany (Mar-07) (3)");
    }

    #[test]
    fn test_unique_sheet_name_stays_within_limit() {
        let label = sheet_label("Saint Vincent and the Grenadines", date());
        let name = unique_sheet_name(&label, [label.as_str()]);
        assert!(name.chars().count() <= MAX_SHEET_NAME);
        assert!(name.ends_with(" (2)"));
    }
}
