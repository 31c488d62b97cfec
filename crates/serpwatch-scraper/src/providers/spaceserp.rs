//! SpaceSerp adapter.
//!
//! JSON API: `GET /google/search?apiKey=...&q=...`. Organic results arrive
//! under `organic_results`; items carry `position`, `title`, and `link`.
//! No city-level targeting.

use serde_json::Value;
use serpwatch_core::{Keyword, ScrapeSettings, SerpEntry};

use crate::countries;

use super::{api_base, collect_entries, Provider};

pub(super) const DESCRIPTOR: Provider = Provider {
    id: "spaceserp",
    name: "SpaceSerp",
    website: "https://spaceserp.com",
    allows_city: false,
    result_key: Some("organic_results"),
    build_url,
    build_headers: None,
    extract: Some(extract),
};

fn build_url(keyword: &Keyword, settings: &ScrapeSettings) -> Option<String> {
    if settings.api_key.is_empty() {
        return None;
    }
    let base = api_base(settings, "https://api.spaceserp.com");
    let mut url = reqwest::Url::parse(&format!("{base}/google/search")).ok()?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("apiKey", &settings.api_key);
        pairs.append_pair("q", &keyword.keyword);
        pairs.append_pair("domain", "google.com");
        pairs.append_pair("gl", &keyword.country.to_ascii_lowercase());
        pairs.append_pair("hl", countries::language_for(&keyword.country));
        pairs.append_pair("device", keyword.device.as_str());
        pairs.append_pair("pageSize", "100");
        pairs.append_pair("resultBlocks", "organic_results");
    }
    Some(url.into())
}

fn extract(section: &Value) -> Vec<SerpEntry> {
    let Some(items) = section.as_array() else {
        return Vec::new();
    };
    collect_entries(items, |item| {
        (
            item.get("title").and_then(Value::as_str).map(String::from),
            item.get("link").and_then(Value::as_str).map(String::from),
            item.get("position")
                .and_then(Value::as_u64)
                .and_then(|p| u32::try_from(p).ok()),
        )
    })
}
