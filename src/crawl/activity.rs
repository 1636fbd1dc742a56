//! Activity check: an entity counts as active when its archive lists past events.

use crate::directory::parser::archive_item_count;
use crate::directory::selectors::entity;
use crate::directory::DirectoryFetch;
use crate::error::FetchError;
use tracing::debug;

/// Decides whether an entity is worth extracting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityFilter;

impl ActivityFilter {
    pub fn new() -> Self {
        Self
    }

    /// Fetches the entity's past-events view and reports whether it lists anything.
    ///
    /// A view without the archive list counts as inactive. Fetch failures propagate.
    pub async fn is_active(
        &self,
        client: &impl DirectoryFetch,
        link: &str,
    ) -> Result<bool, FetchError> {
        let html = client.fetch(link, &entity::ARCHIVE_QUERY).await?;
        let count = archive_item_count(&html);
        debug!("{} has {} archived events", link, count);
        Ok(count > 0)
    }
}
