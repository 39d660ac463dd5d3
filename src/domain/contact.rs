use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use url::Url;

use super::lead::{LeadRecord, NOT_AVAILABLE};

const FALLBACK_DESCRIPTION_CHARS: usize = 200;

static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});
static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})").unwrap()
});
static RE_LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?linkedin\.com/(?:company|in)/[A-Za-z0-9_-]+").unwrap()
});
static RE_SOCIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:instagram\.com|facebook\.com|twitter\.com|x\.com)/[A-Za-z0-9_.]+")
        .unwrap()
});

/// Partial lead scraped straight out of page text, used when structured
/// extraction is unavailable.
pub fn fallback_lead(website_url: &str, content: &str) -> LeadRecord {
    let emails = RE_EMAIL
        .find_iter(content)
        .map(|m| m.as_str())
        .unique()
        .take(3)
        .join(", ");

    let phones = RE_PHONE
        .captures_iter(content)
        .map(|cap| format!("{}-{}-{}", &cap[1], &cap[2], &cap[3]))
        .unique()
        .take(2)
        .join(", ");

    let linkedin = RE_LINKEDIN
        .find_iter(content)
        .map(|m| m.as_str())
        .unique()
        .take(2)
        .join(", ");

    let social_media = RE_SOCIAL
        .find_iter(content)
        .map(|m| m.as_str())
        .unique()
        .take(3)
        .join(", ");

    let description = match content.char_indices().nth(FALLBACK_DESCRIPTION_CHARS) {
        Some((byte_index, _)) => format!("{}...", &content[..byte_index]),
        None => content.to_string(),
    };

    LeadRecord {
        company_name: company_name_from_url(website_url)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        email: or_not_available(emails),
        phone: or_not_available(phones),
        linkedin: or_not_available(linkedin),
        website: website_url.to_string(),
        description: or_not_available(description),
        social_media: or_not_available(social_media),
        ..LeadRecord::default()
    }
}

/// `https://www.acme-labs.io/about` becomes `Acme-Labs`.
pub fn company_name_from_url(website_url: &str) -> Option<String> {
    let parsed_url = Url::parse(website_url).ok()?;
    let host = parsed_url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    match host.split('.').next() {
        Some("") | None => None,
        Some(label) => Some(title_case(label)),
    }
}

fn title_case(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    let mut at_word_start = true;

    for c in word.chars() {
        match at_word_start {
            true => result.extend(c.to_uppercase()),
            false => result.extend(c.to_lowercase()),
        }
        at_word_start = !c.is_alphabetic();
    }

    result
}

fn or_not_available(value: String) -> String {
    match value.trim().is_empty() {
        true => NOT_AVAILABLE.to_string(),
        false => value,
    }
}
