//! CSS selectors and page markers for the promoter directory.
//!
//! Everything the crawler assumes about the site's markup lives here.
//! When a crawl fails with a structural error, capture the page,
//! update the selectors, and add a fixture under `tests/fixtures/`.

use scraper::Selector;
use std::sync::LazyLock;

/// Generic building blocks shared by several pages.
pub static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

pub static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Selectors for region and sub-region listing pages.
pub mod listing {
    use super::*;

    /// CSS source of the list holding region (or sub-region) entries.
    pub const LINKS_CONTAINER: &str = "ul.links";

    /// The list holding region (or sub-region) entries.
    pub static LINKS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(LINKS_CONTAINER).unwrap());

    /// Class marking a sub-region entry that has nested listings.
    pub const PARENT_CLASS: &str = "parent";

    /// CSS source of the form that hosts a sub-region's promoter list.
    pub const ENTITY_CONTAINER: &str = "#Form1";

    /// Substring that distinguishes entity links from navigation links.
    pub const ENTITY_MARKER: &str = "id=";
}

/// Selectors and markers for a promoter's own page.
pub mod entity {
    use super::*;

    /// Promoter name heading.
    pub static NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

    /// Text that labels the contact section; its heading's parent holds the links.
    pub const CONTACT_PHRASE: &str = "On the internet";

    /// Candidate nodes for the phone number.
    pub static PHONE_CANDIDATE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("li div").unwrap());

    /// Text marking the phone candidate.
    pub const PHONE_LABEL: &str = "Phone";

    /// Element carrying an obfuscated email in its data attribute.
    pub static CF_EMAIL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[data-cfemail]").unwrap());

    pub const CF_EMAIL_ATTR: &str = "data-cfemail";

    /// Query appended to an entity link to request its past events.
    pub const ARCHIVE_QUERY: [(&str, &str); 2] = [("show", "events"), ("past", "1")];

    /// List of archived events on the past-events view.
    pub static ARCHIVE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("ul#items").unwrap());
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        let _ = &*LIST_ITEM;
        let _ = &*ANCHOR;
        let _ = &*listing::LINKS;
        let _ = &*entity::NAME;
        let _ = &*entity::PHONE_CANDIDATE;
        let _ = &*entity::CF_EMAIL;
        let _ = &*entity::ARCHIVE;
        assert!(Selector::parse(listing::ENTITY_CONTAINER).is_ok());
    }

    #[test]
    fn test_archive_selector_matching() {
        let html = Html::parse_document(
            r#"<ul id="other"><li>x</li></ul><ul id="items"><li>a</li><li>b</li></ul>"#,
        );
        let archive = html.select(&entity::ARCHIVE).next().unwrap();
        assert_eq!(archive.select(&LIST_ITEM).count(), 2);
    }
}
