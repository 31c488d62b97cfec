//! ScrapingRobot adapter.
//!
//! HTML proxy: `GET /?token=...&url=<search URL>`. Only the keyword inside
//! the target search URL is percent-encoded; the target itself is passed
//! literally, which is the shape the service documents. The response is a
//! JSON envelope whose `result` field holds the raw SERP page, so
//! extraction goes through the generic HTML parser.

use serpwatch_core::{Device, Keyword, ScrapeSettings};

use crate::request::google_search_url;

use super::{api_base, Provider};

pub(super) const DESCRIPTOR: Provider = Provider {
    id: "scrapingrobot",
    name: "Scraping Robot",
    website: "https://scrapingrobot.com",
    allows_city: false,
    result_key: Some("result"),
    build_url,
    build_headers: None,
    extract: None,
};

fn build_url(keyword: &Keyword, settings: &ScrapeSettings) -> Option<String> {
    if settings.api_key.is_empty() {
        return None;
    }
    let base = api_base(settings, "https://api.scrapingrobot.com");
    let mobile = if keyword.device == Device::Mobile {
        "&mobile=true"
    } else {
        ""
    };
    let target = google_search_url(keyword, "https://www.google.com");
    Some(format!(
        "{base}/?token={key}&proxyCountry={country}&render=false{mobile}&url={target}",
        key = settings.api_key,
        country = keyword.country.to_ascii_uppercase()
    ))
}
