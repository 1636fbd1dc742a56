//! Promoter directory access: HTTP client, selectors, page parsing, and models.

pub mod client;
pub mod email;
pub mod fields;
pub mod models;
pub mod parser;
pub mod selectors;

pub use client::{DirectoryClient, DirectoryFetch};
pub use models::{CrawlSummary, Dataset, EntityLinks, Record, Region, RegionSummary, SubRegion};
