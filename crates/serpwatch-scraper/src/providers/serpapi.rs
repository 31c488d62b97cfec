//! SerpApi adapter.
//!
//! JSON API: `GET /search.json?engine=google&q=...&api_key=...`. Organic
//! results arrive under `organic_results` with provider-reported 1-based
//! `position` fields. Supports city-level geotargeting via the `location`
//! parameter.

use serde_json::Value;
use serpwatch_core::{Keyword, ScrapeSettings, SerpEntry};

use crate::countries;

use super::{api_base, collect_entries, Provider};

pub(super) const DESCRIPTOR: Provider = Provider {
    id: "serpapi",
    name: "SerpApi",
    website: "https://serpapi.com",
    allows_city: true,
    result_key: Some("organic_results"),
    build_url,
    build_headers: None,
    extract: Some(extract),
};

fn build_url(keyword: &Keyword, settings: &ScrapeSettings) -> Option<String> {
    if settings.api_key.is_empty() {
        return None;
    }
    let base = api_base(settings, "https://serpapi.com");
    let mut url = reqwest::Url::parse(&format!("{base}/search.json")).ok()?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("engine", "google");
        pairs.append_pair("q", &keyword.keyword);
        pairs.append_pair("api_key", &settings.api_key);
        pairs.append_pair("num", "100");
        pairs.append_pair("gl", &keyword.country.to_ascii_lowercase());
        pairs.append_pair("hl", countries::language_for(&keyword.country));
        pairs.append_pair("device", keyword.device.as_str());
        if let Some(city) = keyword.city.as_deref().filter(|c| !c.is_empty()) {
            let mut location = city.to_string();
            if let Some(state) = keyword.state.as_deref().filter(|s| !s.is_empty()) {
                location.push(',');
                location.push_str(state);
            }
            location.push(',');
            location.push_str(countries::name_for(&keyword.country));
            pairs.append_pair("location", &location);
        }
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
