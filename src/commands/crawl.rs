//! Full crawl command implementation.

use crate::config::Config;
use crate::crawl::HierarchyWalker;
use crate::directory::{DirectoryClient, DirectoryFetch};
use crate::export::{ExportSink, XlsxSink};
use crate::format::Formatter;
use anyhow::{Context, Result};
use tracing::info;

/// Crawls the directory and writes one sheet per region.
pub struct CrawlCommand {
    config: Config,
}

impl CrawlCommand {
    /// Creates a new crawl command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the crawl against the live site and returns the formatted summary.
    pub async fn execute(&self) -> Result<String> {
        let client =
            DirectoryClient::new(&self.config).await.context("Failed to create HTTP client")?;
        let mut sink = XlsxSink::new(self.config.workbook_path());

        self.execute_with(&client, &mut sink).await
    }

    /// Runs the crawl with a provided client and sink (for testing).
    pub async fn execute_with(
        &self,
        client: &impl DirectoryFetch,
        sink: &mut impl ExportSink,
    ) -> Result<String> {
        match self.config.max_records {
            Some(max) => info!("Starting crawl (limit: {} records)", max),
            None => info!("Starting crawl (no record limit)"),
        }

        let summary = HierarchyWalker::new(&self.config)
            .walk(client, sink)
            .await
            .context("Crawl aborted")?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_summary(&summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::directory::Dataset;
    use crate::error::FetchError;
    use async_trait::async_trait;

    /// Directory with one region and no promoters.
    struct EmptyDirectory;

    #[async_trait]
    impl DirectoryFetch for EmptyDirectory {
        async fn fetch(&self, path: &str, _query: &[(&str, &str)]) -> Result<String, FetchError> {
            match path {
                "/promoters.aspx" => {
                    Ok(r#"<ul class="links"><li><a href="/r?ai=1">Iceland</a></li></ul>"#.into())
                }
                "/r?ai=1" => Ok(r#"<ul class="links"></ul>"#.into()),
                _ => Err(FetchError::Status { url: path.to_string(), status: 404 }),
            }
        }
    }

    struct FailingSink;

    impl ExportSink for FailingSink {
        fn save(&mut self, _sheet_label: &str, _dataset: &Dataset) -> Result<String> {
            anyhow::bail!("disk full")
        }
    }

    struct CountingSink(usize);

    impl ExportSink for CountingSink {
        fn save(&mut self, sheet_label: &str, _dataset: &Dataset) -> Result<String> {
            self.0 += 1;
            Ok(sheet_label.to_string())
        }
    }

    fn make_test_config() -> Config {
        Config { delay_ms: 0, delay_jitter_ms: 0, format: OutputFormat::Csv, ..Config::default() }
    }

    #[tokio::test]
    async fn test_crawl_command_summary() {
        let cmd = CrawlCommand::new(make_test_config());
        let mut sink = CountingSink(0);

        let output = cmd.execute_with(&EmptyDirectory, &mut sink).await.unwrap();
        assert_eq!(sink.0, 1);
        assert!(output.starts_with("region,sheet,links,records,error\nIceland,Iceland ("));
        assert!(output.ends_with(",0,0,"));
    }

    #[tokio::test]
    async fn test_crawl_command_export_failure() {
        let cmd = CrawlCommand::new(make_test_config());

        let err = cmd.execute_with(&EmptyDirectory, &mut FailingSink).await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Crawl aborted"));
        assert!(message.contains("Iceland"));
        assert!(message.contains("disk full"));
    }
}
