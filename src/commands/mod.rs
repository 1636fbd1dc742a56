//! CLI command implementations.

pub mod crawl;
pub mod promoter;
pub mod regions;

pub use crawl::CrawlCommand;
pub use promoter::PromoterCommand;
pub use regions::RegionsCommand;
