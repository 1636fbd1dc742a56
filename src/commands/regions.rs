//! Region listing command implementation.

use crate::config::Config;
use crate::crawl::HierarchyWalker;
use crate::directory::{DirectoryClient, DirectoryFetch};
use crate::format::Formatter;
use anyhow::{Context, Result};
use tracing::info;

/// Lists the top-level regions of the directory.
pub struct RegionsCommand {
    config: Config,
}

impl RegionsCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<String> {
        let client =
            DirectoryClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_client(&client).await
    }

    /// Lists regions with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl DirectoryFetch) -> Result<String> {
        let regions = HierarchyWalker::new(&self.config)
            .regions(client)
            .await
            .context("Failed to load region listing")?;
        info!("Found {} regions", regions.len());

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_regions(&regions))
    }
}
