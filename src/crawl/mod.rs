//! Crawl orchestration: activity checks and the hierarchy walk.

pub mod activity;
pub mod walker;

pub use activity::ActivityFilter;
pub use walker::HierarchyWalker;
