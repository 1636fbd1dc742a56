//! Per-field resolvers for a promoter's contact section.
//!
//! Every resolver returns `Result<String, FieldError>` and is independent of the
//! others. [`or_unavailable`] turns a failed resolution into a missing field, so
//! one broken link never blanks the rest of the record.

use crate::directory::email::decode_obfuscated;
use crate::directory::selectors::{entity, ANCHOR};
use crate::error::FieldError;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::debug;

static TEN_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{10}").unwrap());

/// Labels of the contact links, as published.
pub mod label {
    pub const EMAIL: &str = "Email";
    pub const WEBSITE: &str = "Website";
    pub const FACEBOOK: &str = "Facebook";
    pub const YOUTUBE: &str = "Youtube";
    pub const INSTAGRAM: &str = "Instagram";
    pub const TWITTER: &str = "Twitter";
    pub const PHONE: &str = "Phone";
}

/// Falls back to an unavailable field when a resolver fails.
pub fn or_unavailable(field: &'static str, result: Result<String, FieldError>) -> Option<String> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("{} unavailable: {}", field, e);
            None
        }
    }
}

/// Finds the first link in `scope` whose visible text contains `label`, ignoring case.
pub fn find_labeled_anchor<'a>(
    scope: ElementRef<'a>,
    label: &'static str,
) -> Result<ElementRef<'a>, FieldError> {
    let needle = label.to_lowercase();
    scope
        .select(&ANCHOR)
        .find(|a| a.text().collect::<String>().to_lowercase().contains(&needle))
        .ok_or(FieldError::NotFound { label })
}

/// Resolves a link field to its `href`, taken verbatim.
pub fn resolve_href(scope: ElementRef, label: &'static str) -> Result<String, FieldError> {
    let anchor = find_labeled_anchor(scope, label)?;
    match anchor.value().attr("href") {
        Some(href) if !href.trim().is_empty() => Ok(href.to_string()),
        _ => Err(FieldError::MissingHref { label }),
    }
}

/// Resolves the email field from a plain `mailto:` link or an obfuscated one.
pub fn resolve_email(scope: ElementRef) -> Result<String, FieldError> {
    let anchor = find_labeled_anchor(scope, label::EMAIL)?;
    let href = anchor.value().attr("href").unwrap_or_default();

    if href.get(..7).is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto:")) {
        let address = &href[7..];
        if address.is_empty() {
            return Err(FieldError::Malformed {
                label: label::EMAIL,
                reason: "empty mailto address".to_string(),
            });
        }
        return Ok(address.to_string());
    }

    if let Some((_, token)) = href.split_once('#') {
        return decode_obfuscated(token);
    }

    // Some pages leave the href bare and put the token on an inner element.
    let cf_token = anchor
        .value()
        .attr(entity::CF_EMAIL_ATTR)
        .or_else(|| anchor.select(&entity::CF_EMAIL).next()?.value().attr(entity::CF_EMAIL_ATTR));
    if let Some(token) = cf_token {
        return decode_obfuscated(token);
    }

    if href.is_empty() {
        Err(FieldError::MissingHref { label: label::EMAIL })
    } else {
        Err(FieldError::Malformed {
            label: label::EMAIL,
            reason: format!("unrecognised email link '{}'", href),
        })
    }
}

/// Resolves the phone number from the first `li div` mentioning "Phone".
pub fn resolve_phone(document: &Html) -> Result<String, FieldError> {
    let text = document
        .select(&entity::PHONE_CANDIDATE)
        .map(|div| div.text().collect::<String>())
        .find(|text| text.contains(entity::PHONE_LABEL))
        .ok_or(FieldError::NotFound { label: label::PHONE })?;

    first_ten_digit_run(&text).map(String::from).ok_or_else(|| FieldError::Malformed {
        label: label::PHONE,
        reason: "no 10-digit number".to_string(),
    })
}

/// Returns the first ten consecutive ASCII digits. Longer runs are cut to their first ten.
pub fn first_ten_digit_run(text: &str) -> Option<&str> {
    TEN_DIGITS.find(text).map(|m| m.as_str())
}
