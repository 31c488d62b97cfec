//! Serply adapter.
//!
//! JSON API with the query embedded in the path:
//! `GET /v1/search/q=...&num=100&gl=...`, authenticated via the
//! `X-Api-Key` header. Device and geo travel as headers too
//! (`X-User-Agent`, `X-Proxy-Location`). Organic results arrive under
//! `results`; items carry `title`, `link`, and `realPosition`.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::Value;
use serpwatch_core::{Keyword, ScrapeSettings, SerpEntry};

use crate::countries;

use super::{api_base, collect_entries, Provider};

pub(super) const DESCRIPTOR: Provider = Provider {
    id: "serply",
    name: "Serply",
    website: "https://serply.io",
    allows_city: false,
    result_key: Some("results"),
    build_url,
    build_headers: Some(build_headers),
    extract: Some(extract),
};

fn build_url(keyword: &Keyword, settings: &ScrapeSettings) -> Option<String> {
    if settings.api_key.is_empty() {
        return None;
    }
    let base = api_base(settings, "https://api.serply.io");
    let query = utf8_percent_encode(&keyword.keyword, NON_ALPHANUMERIC);
    let hl = countries::language_for(&keyword.country);
    Some(format!(
        "{base}/v1/search/q={query}&num=100&hl={hl}&gl={gl}",
        gl = keyword.country.to_ascii_lowercase()
    ))
}

fn build_headers(keyword: &Keyword, settings: &ScrapeSettings) -> Vec<(&'static str, String)> {
    vec![
        ("X-Api-Key", settings.api_key.clone()),
        ("X-User-Agent", keyword.device.as_str().to_string()),
        ("X-Proxy-Location", keyword.country.to_ascii_uppercase()),
    ]
}

fn extract(section: &Value) -> Vec<SerpEntry> {
    let Some(items) = section.as_array() else {
        return Vec::new();
    };
    collect_entries(items, |item| {
        (
            item.get("title").and_then(Value::as_str).map(String::from),
            item.get("link").and_then(Value::as_str).map(String::from),
            item.get("realPosition")
                .and_then(Value::as_u64)
                .and_then(|p| u32::try_from(p).ok()),
        )
    })
}
