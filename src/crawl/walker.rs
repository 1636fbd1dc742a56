//! Region → sub-region → entity traversal.
//!
//! Regions are processed one after another. Each region's records are
//! accumulated into a [`Dataset`] and handed to the export sink once all of its
//! sub-regions are done. Within a sub-region, entity checks run through a
//! bounded, order-preserving pipeline.

use crate::config::Config;
use crate::crawl::activity::ActivityFilter;
use crate::directory::parser::{
    collect_entity_links, parse_record, parse_regions, parse_sub_regions,
};
use crate::directory::selectors::listing;
use crate::directory::{CrawlSummary, Dataset, DirectoryFetch, Record, Region, RegionSummary};
use crate::error::{CrawlError, ParseError};
use crate::export::{sheet_label, ExportSink};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Walks the directory hierarchy and exports one dataset per region.
#[derive(Debug, Clone)]
pub struct HierarchyWalker {
    start_path: String,
    concurrency: usize,
    max_records: Option<usize>,
    region_filter: Vec<String>,
    date: NaiveDate,
    activity: ActivityFilter,
}

/// What a single region produced before it was flushed.
struct RegionOutcome {
    dataset: Dataset,
    links: usize,
    limit_reached: bool,
}

impl HierarchyWalker {
    /// Creates a walker from configuration, labelling sheets with today's date.
    pub fn new(config: &Config) -> Self {
        Self {
            start_path: config.start_path.clone(),
            concurrency: config.concurrency.max(1),
            max_records: config.max_records.filter(|&max| max > 0),
            region_filter: config.regions.iter().map(|r| r.trim().to_lowercase()).collect(),
            date: chrono::Local::now().date_naive(),
            activity: ActivityFilter::new(),
        }
    }

    /// Overrides the date used in sheet labels.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Fetches and parses the top-level region listing.
    pub async fn regions(&self, client: &impl DirectoryFetch) -> Result<Vec<Region>, CrawlError> {
        let html = client.fetch(&self.start_path, &[]).await?;
        parse_regions(&html).map_err(|e| CrawlError::structural(&self.start_path, e))
    }

    /// Runs the full crawl, saving each finished region through `sink`.
    ///
    /// Structural and export failures abort the run. A fetch failure abandons
    /// only the region it happened in; that region is reported as failed and
    /// nothing is written for it.
    pub async fn walk(
        &self,
        client: &impl DirectoryFetch,
        sink: &mut impl ExportSink,
    ) -> Result<CrawlSummary, CrawlError> {
        let regions = self.selected(self.regions(client).await?);
        info!("Crawling {} regions", regions.len());

        let mut summary = CrawlSummary::default();

        for region in regions {
            let remaining = self.max_records.map(|max| max.saturating_sub(summary.total_records()));

            info!("Region: {}", region.name);
            let outcome = match self.crawl_region(client, &region, remaining).await {
                Ok(outcome) => outcome,
                Err(CrawlError::Fetch(e)) => {
                    warn!("Abandoning region {}: {}", region.name, e);
                    summary.regions.push(RegionSummary {
                        region: region.name,
                        sheet: None,
                        links: 0,
                        records: 0,
                        error: Some(format!("{:#}", anyhow::Error::new(e))),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let label = sheet_label(&region.name, self.date);
            let sheet = sink
                .save(&label, &outcome.dataset)
                .map_err(|source| CrawlError::Export { region: region.name.clone(), source })?;

            summary.regions.push(RegionSummary {
                region: region.name,
                sheet: Some(sheet),
                links: outcome.links,
                records: outcome.dataset.len(),
                error: None,
            });

            if outcome.limit_reached {
                info!("Record limit reached, stopping");
                summary.limit_reached = true;
                break;
            }
        }

        info!(
            "Crawl finished: {} records across {} regions ({} failed)",
            summary.total_records(),
            summary.regions.len(),
            summary.failed_regions()
        );
        Ok(summary)
    }

    /// Applies the configured region name filter.
    fn selected(&self, regions: Vec<Region>) -> Vec<Region> {
        if self.region_filter.is_empty() {
            return regions;
        }

        let selected: Vec<Region> = regions
            .into_iter()
            .filter(|r| self.region_filter.contains(&r.name.to_lowercase()))
            .collect();

        if selected.is_empty() {
            warn!("No regions match filter: {}", self.region_filter.join(", "));
        }
        selected
    }

    async fn crawl_region(
        &self,
        client: &impl DirectoryFetch,
        region: &Region,
        remaining: Option<usize>,
    ) -> Result<RegionOutcome, CrawlError> {
        let html = client.fetch(&region.link, &[]).await?;
        let sub_regions =
            parse_sub_regions(&html).map_err(|e| CrawlError::structural(&region.link, e))?;
        debug!("{}: {} sub-regions", region.name, sub_regions.len());

        let mut outcome =
            RegionOutcome { dataset: Dataset::new(&region.name), links: 0, limit_reached: false };

        for sub_region in sub_regions {
            let html = client.fetch(&sub_region.link, &[]).await?;
            let links = collect_entity_links(&html, listing::ENTITY_CONTAINER)
                .map_err(|e| CrawlError::structural(&sub_region.link, e))?;
            info!("{} / {}: {} promoters", region.name, sub_region.name, links.len());
            outcome.links += links.len();

            let mut pipeline = stream::iter(links.iter())
                .map(|link| self.extract_active(client, link))
                .buffered(self.concurrency);

            while let Some(result) = pipeline.next().await {
                let Some(record) = result? else {
                    continue;
                };
                outcome.dataset.push(record);

                if remaining.is_some_and(|max| outcome.dataset.len() >= max) {
                    outcome.limit_reached = true;
                    return Ok(outcome);
                }
            }
        }

        Ok(outcome)
    }

    /// Extracts the entity's record if it has past events.
    ///
    /// Returns `None` for inactive entities and for pages without a name.
    async fn extract_active(
        &self,
        client: &impl DirectoryFetch,
        link: &str,
    ) -> Result<Option<Record>, CrawlError> {
        if !self.activity.is_active(client, link).await? {
            debug!("Skipping inactive {}", link);
            return Ok(None);
        }

        let html = client.fetch(link, &[]).await?;
        match parse_record(&html) {
            Ok(record) => {
                debug!("Extracted {}", record.name);
                Ok(Some(record))
            }
            Err(ParseError::MissingName) => {
                warn!("Skipping {}: no name on page", link);
                Ok(None)
            }
            Err(e) => Err(CrawlError::structural(link, e)),
        }
    }
}
