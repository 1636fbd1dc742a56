//! Output formatting for records, regions, and crawl summaries (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::directory::{CrawlSummary, Record, Region};

/// Formats crawl results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single record.
    pub fn format_record(&self, record: &Record) -> String {
        match self.format {
            OutputFormat::Json => self.json(record, "{}"),
            OutputFormat::Table => self.table_single(record),
            OutputFormat::Markdown => self.markdown_single(record),
            OutputFormat::Csv => self.csv_records(std::slice::from_ref(record)),
        }
    }

    /// Formats multiple records.
    pub fn format_records(&self, records: &[Record]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::csv_row(Record::COLUMNS),
                _ => "No promoters found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json(records, "[]"),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => self.csv_records(records),
        }
    }

    /// Formats the top-level region listing.
    pub fn format_regions(&self, regions: &[Region]) -> String {
        match self.format {
            OutputFormat::Json => self.json(regions, "[]"),
            OutputFormat::Csv => std::iter::once("name,link".to_string())
                .chain(regions.iter().map(|r| {
                    format!("{},{}", Self::csv_escape(&r.name), Self::csv_escape(&r.link))
                }))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Markdown => {
                let mut lines =
                    vec!["| Region | Link |".to_string(), "|--------|------|".to_string()];
                lines.extend(regions.iter().map(|r| format!("| {} | {} |", r.name, r.link)));
                lines.join("\n")
            }
            OutputFormat::Table => {
                if regions.is_empty() {
                    return "No regions found.".to_string();
                }
                let name_width =
                    regions.iter().map(|r| r.name.chars().count()).max().unwrap_or(0).max(6);
                let mut lines = vec![
                    format!("{:<name_width$}  {}", "Region", "Link"),
                    format!("{:-<name_width$}  {:-<30}", "", ""),
                ];
                lines.extend(
                    regions.iter().map(|r| format!("{:<name_width$}  {}", r.name, r.link)),
                );
                lines.push(String::new());
                lines.push(format!("Total: {} regions", regions.len()));
                lines.join("\n")
            }
        }
    }

    /// Formats a crawl summary, one line per region.
    pub fn format_summary(&self, summary: &CrawlSummary) -> String {
        match self.format {
            OutputFormat::Json => self.json(summary, "{}"),
            OutputFormat::Csv => {
                let mut lines = vec!["region,sheet,links,records,error".to_string()];
                for r in &summary.regions {
                    lines.push(format!(
                        "{},{},{},{},{}",
                        Self::csv_escape(&r.region),
                        Self::csv_escape(r.sheet.as_deref().unwrap_or_default()),
                        r.links,
                        r.records,
                        Self::csv_escape(r.error.as_deref().unwrap_or_default())
                    ));
                }
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines = vec![
                    "| Region | Sheet | Promoters | Records | Status |".to_string(),
                    "|--------|-------|-----------|---------|--------|".to_string(),
                ];
                for r in &summary.regions {
                    lines.push(format!(
                        "| {} | {} | {} | {} | {} |",
                        r.region,
                        r.sheet.as_deref().unwrap_or("-"),
                        r.links,
                        r.records,
                        r.error.as_deref().map_or("ok".to_string(), |e| format!("failed: {}", e))
                    ));
                }
                lines.push(String::new());
                lines.push(self.totals_line(summary));
                lines.join("\n")
            }
            OutputFormat::Table => {
                let mut lines = vec![
                    format!(
                        "{:<24}  {:<31}  {:>9}  {:>7}  {}",
                        "Region", "Sheet", "Promoters", "Records", "Status"
                    ),
                    format!("{:-<24}  {:-<31}  {:->9}  {:->7}  {:-<6}", "", "", "", "", ""),
                ];
                for r in &summary.regions {
                    let status = match &r.error {
                        Some(e) => format!("failed: {}", e),
                        None => "ok".to_string(),
                    };
                    lines.push(format!(
                        "{:<24}  {:<31}  {:>9}  {:>7}  {}",
                        Self::truncate(&r.region, 24),
                        r.sheet.as_deref().unwrap_or("-"),
                        r.links,
                        r.records,
                        status
                    ));
                }
                lines.push(String::new());
                lines.push(self.totals_line(summary));
                lines.join("\n")
            }
        }
    }

    fn totals_line(&self, summary: &CrawlSummary) -> String {
        let mut line = format!(
            "Total: {} records from {} regions",
            summary.total_records(),
            summary.regions.len()
        );
        if summary.failed_regions() > 0 {
            line.push_str(&format!(", {} failed", summary.failed_regions()));
        }
        if summary.limit_reached {
            line.push_str(" (record limit reached)");
        }
        line
    }

    // JSON formatting

    fn json<T: serde::Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
    }

    // Table formatting

    fn table_single(&self, record: &Record) -> String {
        Record::COLUMNS
            .iter()
            .zip(record.values())
            .map(|(column, value)| format!("{:<10} {}", format!("{}:", column), value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table_records(&self, records: &[Record]) -> String {
        let name_width = 30;
        let email_width = 32;
        let phone_width = 10;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<name_width$}  {:<email_width$}  {:<phone_width$}  {}",
            "Name", "Email", "Phone", "Website"
        ));
        lines.push(format!(
            "{:-<name_width$}  {:-<email_width$}  {:-<phone_width$}  {:-<30}",
            "", "", "", ""
        ));

        for record in records {
            let [name, email, website, _, _, _, phone, _] = record.values();
            lines.push(format!(
                "{:<name_width$}  {:<email_width$}  {:<phone_width$}  {}",
                Self::truncate(name, name_width),
                Self::truncate(email, email_width),
                phone,
                website
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} promoters", records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, record: &Record) -> String {
        let mut lines = vec![format!("## {}", record.name), String::new()];

        for (column, value) in Record::COLUMNS.iter().zip(record.values()).skip(1) {
            lines.push(format!("- **{}:** {}", column, value));
        }

        lines.join("\n")
    }

    fn markdown_records(&self, records: &[Record]) -> String {
        let mut lines = vec![
            format!("| {} |", Record::COLUMNS.join(" | ")),
            format!("|{}", "------|".repeat(Record::COLUMNS.len())),
        ];

        for record in records {
            let cells: Vec<String> =
                record.values().iter().map(|v| v.replace('|', "\\|")).collect();
            lines.push(format!("| {} |", cells.join(" | ")));
        }

        lines.push(String::new());
        lines.push(format!("*{} promoters found*", records.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_records(&self, records: &[Record]) -> String {
        std::iter::once(Self::csv_row(Record::COLUMNS))
            .chain(records.iter().map(|r| Self::csv_row(r.values())))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn csv_row(values: [&str; 8]) -> String {
        values.iter().map(|v| Self::csv_escape(v)).collect::<Vec<_>>().join(",")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }

    fn truncate(s: &str, width: usize) -> String {
        if s.chars().count() > width {
            format!("{}...", s.chars().take(width - 3).collect::<String>())
        } else {
            s.to_string()
        }
    }
}
