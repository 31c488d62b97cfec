//! ScrapingAnt adapter.
//!
//! HTML-through-JSON proxy: `GET /v2/extended?url=<encoded search URL>`.
//! The response is a JSON envelope whose `html` field holds the raw SERP
//! page, so extraction goes through the generic HTML parser (no custom
//! extractor).

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serpwatch_core::{Keyword, ScrapeSettings};

use crate::request::google_search_url;

use super::{api_base, Provider};

pub(super) const DESCRIPTOR: Provider = Provider {
    id: "scrapingant",
    name: "ScrapingAnt",
    website: "https://scrapingant.com",
    allows_city: false,
    result_key: Some("html"),
    build_url,
    build_headers: None,
    extract: None,
};

fn build_url(keyword: &Keyword, settings: &ScrapeSettings) -> Option<String> {
    if settings.api_key.is_empty() {
        return None;
    }
    let base = api_base(settings, "https://api.scrapingant.com");
    let target = google_search_url(keyword, "https://www.google.com");
    let target = utf8_percent_encode(&target, NON_ALPHANUMERIC);
    Some(format!(
        "{base}/v2/extended?url={target}&x-api-key={key}&proxy_country={country}&browser=false",
        key = settings.api_key,
        country = keyword.country.to_ascii_uppercase()
    ))
}
