//! Outbound request construction.
//!
//! Turns a (keyword, settings, provider) triple into a [`ScrapeRequest`].
//! Provider requests go to the adapter's URL with the adapter's headers
//! merged over the base set. Without a provider the request targets the
//! search engine directly, optionally through one proxy chosen uniformly
//! at random from the configured pool.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rand::Rng;
use serpwatch_core::{Device, Keyword, ScrapeSettings};

use crate::countries;
use crate::error::ScrapeError;
use crate::providers::Provider;

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";
const MOBILE_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Mobile Safari/537.36";

const JSON_ACCEPT: &str = "application/json; charset=utf8";
/// Accept value for raw search-engine fetches, which come back as
/// (possibly compressed) HTML rather than JSON.
const DIRECT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A fully-described outbound call: target, headers, optional proxy.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    /// Proxy URL to route the connection through (direct path only).
    pub proxy: Option<String>,
}

/// Builds the search-engine query URL for a keyword.
///
/// Only the keyword itself is percent-encoded; the rest of the URL is
/// literal so providers that accept an unencoded target receive exactly
/// this shape.
pub(crate) fn google_search_url(keyword: &Keyword, base: &str) -> String {
    let query = utf8_percent_encode(&keyword.keyword, NON_ALPHANUMERIC);
    format!(
        "{base}/search?num=100&hl={hl}&gl={gl}&q={query}",
        base = base.trim_end_matches('/'),
        hl = countries::language_for(&keyword.country),
        gl = keyword.country.to_ascii_uppercase()
    )
}

/// Builds the request for one keyword scrape.
///
/// # Errors
///
/// Returns [`ScrapeError::NotConfigured`] when the selected provider cannot
/// produce a URL from these settings. Nothing is sent in that case.
pub fn build_scrape_request(
    keyword: &Keyword,
    settings: &ScrapeSettings,
    provider: Option<&Provider>,
) -> Result<ScrapeRequest, ScrapeError> {
    let user_agent = match keyword.device {
        Device::Desktop => DESKTOP_UA,
        Device::Mobile => MOBILE_UA,
    };
    let mut headers: Vec<(&'static str, String)> = vec![
        ("User-Agent", user_agent.to_string()),
        ("Accept", JSON_ACCEPT.to_string()),
    ];

    if let Some(provider) = provider {
        // Capability gate: strip city-level targeting before the adapter
        // ever sees it unless the provider advertises support.
        let keyword = if provider.allows_city {
            keyword.clone()
        } else {
            Keyword {
                city: None,
                state: None,
                ..keyword.clone()
            }
        };

        let Some(url) = (provider.build_url)(&keyword, settings) else {
            return Err(ScrapeError::NotConfigured {
                reason: format!("provider {} produced no URL", provider.id),
            });
        };
        if let Some(build_headers) = provider.build_headers {
            for (name, value) in build_headers(&keyword, settings) {
                if let Some(existing) = headers.iter_mut().find(|(n, _)| *n == name) {
                    existing.1 = value;
                } else {
                    headers.push((name, value));
                }
            }
        }
        return Ok(ScrapeRequest {
            url,
            headers,
            proxy: None,
        });
    }

    // No provider: hit the search engine directly. With a proxy pool this
    // has a fighting chance; without one it is best-effort and likely
    // blocked, but still not an error at this stage.
    let base = settings
        .api_base
        .as_deref()
        .unwrap_or("https://www.google.com");
    let url = google_search_url(keyword, base);
    if let Some(accept) = headers.iter_mut().find(|(n, _)| *n == "Accept") {
        accept.1 = DIRECT_ACCEPT.to_string();
    }
    let proxy = settings.proxy_list.as_deref().and_then(pick_proxy);

    Ok(ScrapeRequest {
        url,
        headers,
        proxy,
    })
}

/// Picks one proxy uniformly at random from a newline-separated pool.
fn pick_proxy(pool: &str) -> Option<String> {
    let proxies: Vec<&str> = pool
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if proxies.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..proxies.len());
    Some(proxies[index].to_string())
}
