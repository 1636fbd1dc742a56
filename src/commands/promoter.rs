//! Single promoter lookup command implementation.

use crate::config::Config;
use crate::directory::parser::parse_record;
use crate::directory::selectors::listing;
use crate::directory::{DirectoryClient, DirectoryFetch, Record};
use crate::format::Formatter;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Extracts contact records for individual promoter links.
pub struct PromoterCommand {
    config: Config,
}

impl PromoterCommand {
    /// Creates a new promoter command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches a promoter page and returns the formatted record.
    pub async fn execute(&self, link: &str) -> Result<String> {
        let client =
            DirectoryClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_client(&client, link).await
    }

    /// Fetches a promoter with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl DirectoryFetch,
        link: &str,
    ) -> Result<String> {
        let record = self.lookup(client, link).await?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_record(&record))
    }

    /// Fetches several promoter pages. Links that fail are reported and skipped.
    pub async fn execute_batch(&self, links: &[String]) -> Result<String> {
        let client =
            DirectoryClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_batch_with_client(&client, links).await
    }

    /// Fetches several promoters with a provided client (for testing).
    pub async fn execute_batch_with_client(
        &self,
        client: &impl DirectoryFetch,
        links: &[String],
    ) -> Result<String> {
        let mut records: Vec<Record> = Vec::new();

        for link in links {
            match self.lookup(client, link).await {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping {}: {:#}", link, e),
            }
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_records(&records))
    }

    async fn lookup(&self, client: &impl DirectoryFetch, link: &str) -> Result<Record> {
        let link = link.trim();
        if !link.contains(listing::ENTITY_MARKER) {
            anyhow::bail!(
                "Invalid promoter link: '{}'. Expected a link with an id= parameter.",
                link
            );
        }

        info!("Looking up promoter: {}", link);

        let html = client
            .fetch(link, &[])
            .await
            .with_context(|| format!("Failed to fetch promoter page {}", link))?;

        parse_record(&html).with_context(|| format!("Failed to parse promoter page {}", link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Mock directory returning the same profile for every link.
    struct MockDirectoryClient {
        profile_html: String,
        should_fail: bool,
        requests: Mutex<Vec<String>>,
    }

    impl MockDirectoryClient {
        fn new(profile_html: String) -> Self {
            Self { profile_html, should_fail: false, requests: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { should_fail: true, ..Self::new(String::new()) }
        }
    }

    #[async_trait]
    impl DirectoryFetch for MockDirectoryClient {
        async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
            let query: Vec<_> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            self.requests.lock().unwrap().push(format!("{} {}", path, query.join("&")));

            if self.should_fail {
                return Err(FetchError::Status { url: path.to_string(), status: 503 });
            }
            Ok(self.profile_html.clone())
        }
    }

    fn make_test_config() -> Config {
        Config { delay_ms: 0, delay_jitter_ms: 0, ..Config::default() }
    }

    fn make_profile_html(name: &str) -> String {
        format!(
            r#"<html><body>
                <h1>{}</h1>
                <ul>
                    <li><div>On the internet</div>
                        <a href="mailto:info@club.example">Email</a>
                        <a href="https://club.example">Website</a></li>
                    <li><div>Phone: 0207946001</div></li>
                </ul>
            </body></html>"#,
            name
        )
    }

    #[tokio::test]
    async fn test_promoter_command_basic() {
        let client = MockDirectoryClient::new(make_profile_html("Club Night"));
        let cmd = PromoterCommand::new(make_test_config());

        let output = cmd.execute_with_client(&client, "/promoter.aspx?id=77").await.unwrap();
        assert!(output.contains("Club Night"));
        assert!(output.contains("info@club.example"));
        assert!(output.contains("0207946001"));
        assert!(output.contains("Facebook:  N/A"));
    }

    #[tokio::test]
    async fn test_promoter_command_fetches_profile_only() {
        let client = MockDirectoryClient::new(make_profile_html("Club Night"));
        let cmd = PromoterCommand::new(make_test_config());

        cmd.execute_with_client(&client, "/promoter.aspx?id=77").await.unwrap();
        assert_eq!(*client.requests.lock().unwrap(), vec!["/promoter.aspx?id=77 ".to_string()]);
    }

    #[tokio::test]
    async fn test_promoter_command_invalid_link() {
        let client = MockDirectoryClient::new(String::new());
        let cmd = PromoterCommand::new(make_test_config());

        let err = cmd.execute_with_client(&client, "/promoters.aspx").await.unwrap_err();
        assert!(err.to_string().contains("Invalid promoter link"));
    }

    #[tokio::test]
    async fn test_promoter_command_missing_name() {
        let client = MockDirectoryClient::new("<html><body></body></html>".to_string());
        let cmd = PromoterCommand::new(make_test_config());

        let err = cmd.execute_with_client(&client, "/promoter.aspx?id=1").await.unwrap_err();
        assert!(format!("{:#}", err).contains("no name heading"));
    }

    #[tokio::test]
    async fn test_promoter_command_network_error() {
        let cmd = PromoterCommand::new(make_test_config());

        let err = cmd
            .execute_with_client(&MockDirectoryClient::failing(), "/promoter.aspx?id=1")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("503"));
    }

    #[tokio::test]
    async fn test_promoter_command_json_format() {
        let client = MockDirectoryClient::new(make_profile_html("Club Night"));
        let config = Config { format: OutputFormat::Json, ..make_test_config() };
        let cmd = PromoterCommand::new(config);

        let output = cmd.execute_with_client(&client, "/promoter.aspx?id=77").await.unwrap();
        assert!(output.starts_with('{'));
        assert!(output.contains("\"twitter\": null"));
    }

    #[tokio::test]
    async fn test_promoter_command_batch_skips_invalid() {
        let client = MockDirectoryClient::new(make_profile_html("Club Night"));
        let cmd = PromoterCommand::new(make_test_config());

        let links = vec![
            "/promoter.aspx?id=1".to_string(),
            "/about".to_string(), // Invalid
            "/promoter.aspx?id=2".to_string(),
        ];
        let output = cmd.execute_batch_with_client(&client, &links).await.unwrap();
        assert!(output.contains("Total: 2 promoters"));
    }
}
