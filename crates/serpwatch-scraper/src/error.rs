use serpwatch_core::ScrapeFailure;
use thiserror::Error;

/// Errors raised while scraping one keyword.
///
/// Internal to the engine; at the orchestrator boundary every variant is
/// converted into the serializable [`ScrapeFailure`] carried by
/// `RefreshResult`, so callers never see `reqwest` types.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the provider or search engine.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The provider produced no URL or required credentials are missing.
    /// The request was never sent.
    #[error("scraper not configured: {reason}")]
    NotConfigured { reason: String },

    /// A provider expected to emit JSON returned something unparseable.
    #[error("JSON deserialization error for {provider}: {source}")]
    Deserialize {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    /// Syntactically valid response with no usable organic entries.
    #[error("response contained no organic results")]
    EmptyResults,
}

impl From<ScrapeError> for ScrapeFailure {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Http(e) => ScrapeFailure::Transport {
                message: e.to_string(),
            },
            ScrapeError::UnexpectedStatus { status, url } => ScrapeFailure::Transport {
                message: format!("unexpected HTTP status {status} from {url}"),
            },
            ScrapeError::NotConfigured { reason } => ScrapeFailure::NotConfigured { reason },
            ScrapeError::Deserialize { provider, source } => ScrapeFailure::Extraction {
                provider,
                message: source.to_string(),
            },
            ScrapeError::EmptyResults => ScrapeFailure::EmptyResults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_error_converts_to_extraction_naming_the_provider() {
        let source = serde_json::from_str::<()>("not json").unwrap_err();
        let failure: ScrapeFailure = ScrapeError::Deserialize {
            provider: "serpapi".to_string(),
            source,
        }
        .into();
        assert!(
            matches!(failure, ScrapeFailure::Extraction { ref provider, .. } if provider == "serpapi")
        );
    }

    #[test]
    fn status_error_preserves_status_and_url_in_message() {
        let failure: ScrapeFailure = ScrapeError::UnexpectedStatus {
            status: 429,
            url: "https://api.example/search".to_string(),
        }
        .into();
        match failure {
            ScrapeFailure::Transport { message } => {
                assert!(message.contains("429"));
                assert!(message.contains("https://api.example/search"));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }
}
