//! Data models for directory listings and extracted promoter records.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Rendered in place of any contact field that could not be resolved.
pub const UNAVAILABLE: &str = "N/A";

/// A top-level listing entry (a country).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Display name as published
    pub name: String,
    /// Link to the region's listing page
    pub link: String,
}

/// A second-level listing entry (a city) that has nested promoter listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRegion {
    pub name: String,
    pub link: String,
}

/// Unique entity links collected from one listing page, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLinks(IndexSet<String>);

impl EntityLinks {
    /// Number of unique links.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.0.contains(link)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for EntityLinks {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Contact record extracted from one promoter page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Promoter name (always present)
    pub name: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub facebook: Option<String>,
    pub youtube: Option<String>,
    pub instagram: Option<String>,
    pub phone: Option<String>,
    pub twitter: Option<String>,
}

impl Record {
    /// Column headers, in export order.
    pub const COLUMNS: [&'static str; 8] =
        ["Name", "Email", "Website", "Facebook", "Youtube", "Instagram", "Phone", "Twitter"];

    /// Creates a record with only a name; every contact field is unavailable.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Cell values in `COLUMNS` order, with the sentinel for missing fields.
    pub fn values(&self) -> [&str; 8] {
        fn field(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or(UNAVAILABLE)
        }

        [
            &self.name,
            field(&self.email),
            field(&self.website),
            field(&self.facebook),
            field(&self.youtube),
            field(&self.instagram),
            field(&self.phone),
            field(&self.twitter),
        ]
    }

    /// Number of contact fields that resolved to a value.
    pub fn resolved_count(&self) -> usize {
        self.values().iter().skip(1).filter(|v| **v != UNAVAILABLE).count()
    }
}

/// Records discovered under one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub region: String,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(region: impl Into<String>) -> Self {
        Self { region: region.into(), records: Vec::new() }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header row followed by one row per record.
    pub fn rows(&self) -> impl Iterator<Item = [&str; 8]> {
        std::iter::once(Record::COLUMNS).chain(self.records.iter().map(Record::values))
    }
}

/// Outcome of one region's processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: String,
    /// Sheet the dataset was written to, if it was exported
    pub sheet: Option<String>,
    /// Unique entity links found across the region's sub-regions
    pub links: usize,
    /// Records written
    pub records: usize,
    /// Error message if the region was abandoned
    pub error: Option<String>,
}

/// Outcome of a whole crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub regions: Vec<RegionSummary>,
    /// True if the crawl stopped early because the record limit was reached
    pub limit_reached: bool,
}

impl CrawlSummary {
    pub fn total_records(&self) -> usize {
        self.regions.iter().map(|r| r.records).sum()
    }

    pub fn failed_regions(&self) -> usize {
        self.regions.iter().filter(|r| r.error.is_some()).count()
    }
}
