//! promoter-crawler - Promoter directory crawler with per-country workbook export
//!
//! Walks country → city → promoter listings, keeps promoters with past events,
//! extracts their contact details, and writes one dated sheet per country.

pub mod commands;
pub mod config;
pub mod crawl;
pub mod directory;
pub mod error;
pub mod export;
pub mod format;

pub use config::Config;
pub use directory::{Dataset, Record};
pub use error::{CrawlError, FetchError, FieldError, ParseError};
