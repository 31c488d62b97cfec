//! Response-body extraction dispatch.
//!
//! Providers with a custom extractor are expected to emit JSON: the body
//! is parsed, the organic section located by the provider's `result_key`
//! (falling back to the `data`/`html`/`results` fields), and handed to the
//! extractor. Malformed JSON from such a provider is a hard extraction
//! error naming the provider — never a silent empty listing.
//!
//! Providers without an extractor return the SERP page itself, either
//! bare or wrapped in a JSON envelope; both shapes funnel into the
//! generic HTML parser.

use serde_json::Value;
use serpwatch_core::{Device, SerpEntry};

use crate::error::ScrapeError;
use crate::providers::Provider;
use crate::serp;

/// Normalizes a response body into a ranked listing.
///
/// # Errors
///
/// Returns [`ScrapeError::Deserialize`] when a JSON-emitting provider's
/// body (or the section embedded in it as a string) fails to parse.
pub fn extract_results(
    body: &str,
    provider: Option<&Provider>,
    device: Device,
) -> Result<Vec<SerpEntry>, ScrapeError> {
    if let Some(provider) = provider {
        if let Some(extractor) = provider.extract {
            let value: Value =
                serde_json::from_str(body).map_err(|e| ScrapeError::Deserialize {
                    provider: provider.id.to_string(),
                    source: e,
                })?;
            let section = result_section(&value, provider.result_key)
                .cloned()
                .unwrap_or(Value::Null);
            // Some providers double-encode the section as a JSON string.
            let section = if let Value::String(inner) = &section {
                serde_json::from_str(inner).map_err(|e| ScrapeError::Deserialize {
                    provider: provider.id.to_string(),
                    source: e,
                })?
            } else {
                section
            };
            return Ok(extractor(&section));
        }

        // HTML-proxy provider: unwrap the JSON envelope when there is one,
        // otherwise treat the body as the page itself.
        if let Some(html) = envelope_html(body, provider.result_key) {
            return Ok(serp::parse_serp_html(&html, device));
        }
    }

    Ok(serp::parse_serp_html(body, device))
}

fn result_section<'a>(value: &'a Value, key: Option<&str>) -> Option<&'a Value> {
    key.and_then(|k| value.get(k))
        .or_else(|| value.get("data"))
        .or_else(|| value.get("html"))
        .or_else(|| value.get("results"))
}

fn envelope_html(body: &str, key: Option<&str>) -> Option<String> {
    if !body.trim_start().starts_with('{') {
        return None;
    }
    let value: Value = serde_json::from_str(body).ok()?;
    result_section(&value, key)?.as_str().map(String::from)
}
