//! HTML parsing for listing pages, archive views, and promoter pages.
//!
//! All functions take the raw page body and return owned data, so no parsed
//! document is ever held across an await point.

use crate::directory::fields::{self, label, or_unavailable};
use crate::directory::models::{EntityLinks, Record, Region, SubRegion};
use crate::directory::selectors::{entity, listing, ANCHOR, LIST_ITEM};
use crate::error::ParseError;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// Parses top-level regions from the listing's links container.
pub fn parse_regions(html: &str) -> Result<Vec<Region>, ParseError> {
    let document = Html::parse_document(html);
    let regions = listing_entries(&document, false)?
        .into_iter()
        .map(|(name, link)| Region { name, link })
        .collect::<Vec<_>>();

    debug!("Parsed {} regions", regions.len());
    Ok(regions)
}

/// Parses sub-regions, keeping only entries marked as having nested listings.
pub fn parse_sub_regions(html: &str) -> Result<Vec<SubRegion>, ParseError> {
    let document = Html::parse_document(html);
    let sub_regions = listing_entries(&document, true)?
        .into_iter()
        .map(|(name, link)| SubRegion { name, link })
        .collect::<Vec<_>>();

    debug!("Parsed {} sub-regions with nested listings", sub_regions.len());
    Ok(sub_regions)
}

/// Reads `(name, link)` pairs from the direct `li` children of the links container.
fn listing_entries(
    document: &Html,
    parents_only: bool,
) -> Result<Vec<(String, String)>, ParseError> {
    let container = document.select(&listing::LINKS).next().ok_or_else(|| {
        ParseError::MissingContainer { selector: listing::LINKS_CONTAINER.to_string() }
    })?;

    let mut entries: Vec<(String, String)> = Vec::new();

    for item in container.children().filter_map(ElementRef::wrap) {
        if item.value().name() != "li" {
            continue;
        }
        if parents_only && !item.value().classes().any(|c| c == listing::PARENT_CLASS) {
            trace!("Skipping leaf entry: {}", item.text().collect::<String>().trim());
            continue;
        }

        let Some(anchor) = item.select(&ANCHOR).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let name = anchor.text().collect::<String>().trim().to_string();
        if name.is_empty() || entries.iter().any(|(_, link)| link == href) {
            continue;
        }

        entries.push((name, href.to_string()));
    }

    Ok(entries)
}

/// Collects unique entity links from every `li` inside `container_selector`.
///
/// An item counts when its first link's `href` contains the entity marker
/// (`id=`). A missing container means the page layout changed and is an error.
pub fn collect_entity_links(
    html: &str,
    container_selector: &str,
) -> Result<EntityLinks, ParseError> {
    let missing =
        || ParseError::MissingContainer { selector: container_selector.to_string() };

    let selector = Selector::parse(container_selector).map_err(|_| missing())?;
    let document = Html::parse_document(html);
    let container = document.select(&selector).next().ok_or_else(missing)?;

    let links: EntityLinks = container
        .select(&LIST_ITEM)
        .filter_map(|item| item.select(&ANCHOR).next()?.value().attr("href"))
        .filter(|href| href.contains(listing::ENTITY_MARKER))
        .collect();

    debug!("Collected {} unique entity links", links.len());
    Ok(links)
}

/// Counts the archived events listed on an entity's past-events view.
///
/// A page without the archive list has no past events.
pub fn archive_item_count(html: &str) -> usize {
    let document = Html::parse_document(html);
    match document.select(&entity::ARCHIVE).next() {
        Some(archive) => archive
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .count(),
        None => {
            trace!("No archive list on page");
            0
        }
    }
}

/// Extracts a promoter record from its page.
///
/// Only the name is required. Every contact field is resolved on its own and
/// left unavailable when it cannot be found.
pub fn parse_record(html: &str) -> Result<Record, ParseError> {
    let document = Html::parse_document(html);

    let name = document
        .select(&entity::NAME)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(ParseError::MissingName)?;

    let mut record = Record::named(name);

    match contact_scope(&document) {
        Some(scope) => {
            record.email = or_unavailable("email", fields::resolve_email(scope));
            record.website = or_unavailable("website", fields::resolve_href(scope, label::WEBSITE));
            record.facebook =
                or_unavailable("facebook", fields::resolve_href(scope, label::FACEBOOK));
            record.youtube = or_unavailable("youtube", fields::resolve_href(scope, label::YOUTUBE));
            record.instagram =
                or_unavailable("instagram", fields::resolve_href(scope, label::INSTAGRAM));
            record.twitter = or_unavailable("twitter", fields::resolve_href(scope, label::TWITTER));
        }
        None => debug!("No contact section for '{}'", record.name),
    }

    record.phone = or_unavailable("phone", fields::resolve_phone(&document));

    trace!("Parsed record: {} ({} fields resolved)", record.name, record.resolved_count());
    Ok(record)
}

/// Finds the element holding the contact links: the parent of the element
/// whose text carries the contact phrase.
fn contact_scope(document: &Html) -> Option<ElementRef<'_>> {
    let text_node = document.root_element().descendants().find(|node| {
        node.value().as_text().is_some_and(|text| text.contains(entity::CONTACT_PHRASE))
    })?;

    let heading = text_node.parent()?;
    ElementRef::wrap(heading.parent()?)
}
