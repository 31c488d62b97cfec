//! Domain types shared between the scrape engine and its consumers.
//!
//! The persistence layer that owns keywords and the scheduler that replays
//! failed scrapes live outside this workspace; they exchange these types as
//! JSON. Everything here is plain data — no behaviour beyond small accessors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Device class a keyword is tracked on. Selects the User-Agent for raw
/// scrapes and the `device` parameter for providers that accept one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Mobile,
}

impl Device {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Mobile => "mobile",
        }
    }
}

/// One tracked (domain, keyword, device, country) tuple.
///
/// Owned by the external CRUD layer; the engine only reads it for the
/// duration of a refresh and reports back via [`RefreshResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    /// Numeric ID assigned by the persistence layer.
    pub id: i64,
    /// The search query being tracked.
    pub keyword: String,
    /// The site whose rank we are tracking, e.g. `"example.com"`.
    pub domain: String,
    #[serde(default)]
    pub device: Device,
    /// ISO country code, e.g. `"US"`.
    pub country: String,
    /// City for providers that advertise city-level targeting. Ignored by
    /// providers without that capability.
    #[serde(default)]
    pub city: Option<String>,
    /// State/region, only meaningful together with `city`.
    #[serde(default)]
    pub state: Option<String>,
}

/// Scrape configuration supplied by the external settings store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSettings {
    /// Provider id to route scrapes through. `None` (or an unknown id)
    /// selects the direct search-engine path.
    #[serde(default)]
    pub provider: Option<String>,
    /// Provider API key. Empty when scraping directly.
    #[serde(default)]
    pub api_key: String,
    /// Secondary credential for providers that require one.
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Newline-separated proxy URLs for the direct path. One is chosen
    /// uniformly at random per scrape.
    #[serde(default)]
    pub proxy_list: Option<String>,
    /// Pause between consecutive scrapes on the serial path, in
    /// milliseconds. Zero disables the pause.
    #[serde(default)]
    pub scrape_delay_ms: u64,
    /// Per-request timeout applied at the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Override for the outbound base URL (provider API host or search
    /// engine origin). Used to point the engine at a mock server in tests;
    /// leave unset in production.
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: String::new(),
            api_secret: None,
            proxy_list: None,
            scrape_delay_ms: 0,
            request_timeout_secs: default_timeout_secs(),
            api_base: None,
        }
    }
}

/// One organic result extracted from a SERP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpEntry {
    pub title: String,
    pub url: String,
    /// 1-based rank. Provider-reported when available, otherwise a running
    /// counter over kept entries.
    pub position: u32,
}

/// Where the tracked domain landed in a listing.
///
/// `position == 0` (with an empty URL) means the scrape succeeded but the
/// domain was not found — a valid outcome, distinct from a failed scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankMatch {
    pub position: u32,
    pub url: String,
}

impl RankMatch {
    #[must_use]
    pub fn not_ranked() -> Self {
        Self {
            position: 0,
            url: String::new(),
        }
    }

    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.position > 0
    }
}

/// Payload of a scrape that completed, whether or not the domain ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeSuccess {
    pub rank: RankMatch,
    /// The full extracted listing, for history/diffing by the consumer.
    pub serp: Vec<SerpEntry>,
}

/// Why a scrape failed. Serializable so consumers can store the reason
/// verbatim against the keyword.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrapeFailure {
    /// No usable request could be built: the provider produced no URL or
    /// required credentials are missing. Nothing was sent.
    #[error("scraper not configured: {reason}")]
    NotConfigured { reason: String },

    /// Network failure, timeout, or non-2xx response.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// A provider expected to emit JSON returned something unparseable.
    #[error("failed to parse {provider} response: {message}")]
    Extraction { provider: String, message: String },

    /// Syntactically valid response with no usable organic entries.
    #[error("response contained no organic results")]
    EmptyResults,
}

/// Outcome of refreshing one keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResult {
    pub keyword_id: i64,
    pub keyword: String,
    pub outcome: Result<ScrapeSuccess, ScrapeFailure>,
}

impl RefreshResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Resolved position when the scrape succeeded. `Some(0)` means the
    /// domain was not found in a valid listing; `None` means the scrape
    /// itself failed.
    #[must_use]
    pub fn position(&self) -> Option<u32> {
        self.outcome.as_ref().ok().map(|s| s.rank.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_deserializes_lowercase() {
        let kw: Keyword = serde_json::from_str(
            r#"{"id":1,"keyword":"best coffee beans","domain":"example.com","device":"mobile","country":"US"}"#,
        )
        .expect("keyword should deserialize");
        assert_eq!(kw.device, Device::Mobile);
        assert_eq!(kw.city, None);
    }

    #[test]
    fn device_defaults_to_desktop_when_absent() {
        let kw: Keyword = serde_json::from_str(
            r#"{"id":2,"keyword":"x","domain":"example.com","country":"DE"}"#,
        )
        .expect("keyword should deserialize");
        assert_eq!(kw.device, Device::Desktop);
    }

    #[test]
    fn not_ranked_is_position_zero_with_empty_url() {
        let rank = RankMatch::not_ranked();
        assert_eq!(rank.position, 0);
        assert!(rank.url.is_empty());
        assert!(!rank.is_ranked());
    }

    #[test]
    fn refresh_result_position_distinguishes_failure_from_not_found() {
        let not_found = RefreshResult {
            keyword_id: 1,
            keyword: "x".to_string(),
            outcome: Ok(ScrapeSuccess {
                rank: RankMatch::not_ranked(),
                serp: vec![],
            }),
        };
        assert_eq!(not_found.position(), Some(0));

        let failed = RefreshResult {
            keyword_id: 1,
            keyword: "x".to_string(),
            outcome: Err(ScrapeFailure::EmptyResults),
        };
        assert_eq!(failed.position(), None);
    }

    #[test]
    fn scrape_failure_serializes_with_kind_tag() {
        let f = ScrapeFailure::Extraction {
            provider: "serpapi".to_string(),
            message: "expected value".to_string(),
        };
        let json = serde_json::to_value(&f).expect("failure should serialize");
        assert_eq!(json["kind"], "extraction");
        assert_eq!(json["provider"], "serpapi");
    }
}
