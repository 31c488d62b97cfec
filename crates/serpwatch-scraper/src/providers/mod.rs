//! Provider registry.
//!
//! Each third-party SERP-fetching service is described by a [`Provider`]
//! value: its capability flags plus the three seams where services differ
//! (request URL, extra headers, response extraction). All provider wire
//! formats live in the adapter modules here — nothing provider-specific
//! leaks into the orchestrator.

mod scrapingant;
mod scrapingrobot;
mod serpapi;
mod serply;
mod spaceserp;
mod valueserp;

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;
use serpwatch_core::{Keyword, ScrapeSettings, SerpEntry};

/// Builds the outbound request URL. `None` means the provider cannot form a
/// request from these settings (e.g. missing credentials) — the caller must
/// fail fast without sending anything.
pub type UrlBuilder = fn(&Keyword, &ScrapeSettings) -> Option<String>;

/// Extra request headers merged over the base header set.
pub type HeaderBuilder = fn(&Keyword, &ScrapeSettings) -> Vec<(&'static str, String)>;

/// Turns the provider's organic-results JSON section into normalized entries.
pub type Extractor = fn(&Value) -> Vec<SerpEntry>;

/// Immutable descriptor for one scraping provider.
pub struct Provider {
    pub id: &'static str,
    pub name: &'static str,
    pub website: &'static str,
    /// Whether the provider supports city-level geotargeting. Keywords
    /// carrying a city are only geotargeted through capable providers.
    pub allows_city: bool,
    /// Field of the JSON envelope holding the organic listing (or, for
    /// HTML-through-JSON providers, the raw page). `None` when the response
    /// body is the payload itself.
    pub result_key: Option<&'static str>,
    pub build_url: UrlBuilder,
    pub build_headers: Option<HeaderBuilder>,
    /// Providers without an extractor fall back to the generic HTML parser.
    pub extract: Option<Extractor>,
}

/// Fixed adapter catalog. Registered once; no runtime additions.
pub static PROVIDERS: [Provider; 6] = [
    serpapi::DESCRIPTOR,
    spaceserp::DESCRIPTOR,
    serply::DESCRIPTOR,
    valueserp::DESCRIPTOR,
    scrapingant::DESCRIPTOR,
    scrapingrobot::DESCRIPTOR,
];

/// Provider ids safe to scrape with full concurrency. Everything else —
/// including the no-provider direct path — runs serially with the
/// configured inter-request delay.
pub static PARALLEL_SAFE: [&str; 3] = ["serpapi", "spaceserp", "serply"];

static REGISTRY: LazyLock<HashMap<&'static str, &'static Provider>> =
    LazyLock::new(|| PROVIDERS.iter().map(|p| (p.id, p)).collect());

/// Look up a provider by id. A miss is not an error: the orchestrator
/// treats it as "no provider configured" and scrapes directly.
#[must_use]
pub fn lookup(id: &str) -> Option<&'static Provider> {
    REGISTRY.get(id).copied()
}

/// Resolved outbound base for a provider, honouring the test override.
pub(crate) fn api_base<'a>(settings: &'a ScrapeSettings, default: &'a str) -> &'a str {
    settings
        .api_base
        .as_deref()
        .unwrap_or(default)
        .trim_end_matches('/')
}

/// Normalizes a provider's listing items into [`SerpEntry`] values.
///
/// `field` pulls `(title, url, provider_position)` out of one raw item.
/// Items missing a title or URL are dropped without consuming a position;
/// when the provider reports no position, a 1-based counter over kept
/// entries is assigned instead.
pub(crate) fn collect_entries<F>(items: &[Value], field: F) -> Vec<SerpEntry>
where
    F: Fn(&Value) -> (Option<String>, Option<String>, Option<u32>),
{
    let mut entries = Vec::new();
    for item in items {
        let (title, url, position) = field(item);
        let Some(title) = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
            continue;
        };
        let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
            continue;
        };
        #[allow(clippy::cast_possible_truncation)]
        let position = position.unwrap_or(entries.len() as u32 + 1);
        entries.push(SerpEntry {
            title,
            url,
            position,
        });
    }
    entries
}
