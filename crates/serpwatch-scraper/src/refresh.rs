//! Refresh orchestration.
//!
//! Drives a batch of keyword scrapes through the configured provider (or
//! the direct path), picks the serial or parallel execution strategy, and
//! keeps the retry queue in sync with each outcome. A single keyword's
//! failure is absorbed into its `RefreshResult`; the batch always
//! completes with one result per keyword, in input order.

use std::time::{Duration, Instant};

use futures::future::join_all;
use reqwest::Client;
use serpwatch_core::{Keyword, RefreshResult, ScrapeSettings, ScrapeSuccess};

use crate::error::ScrapeError;
use crate::extract::extract_results;
use crate::providers::{self, Provider, PARALLEL_SAFE};
use crate::rank::resolve_rank;
use crate::request::{build_scrape_request, ScrapeRequest};
use crate::retry_queue::RetryQueue;

pub struct RefreshOrchestrator {
    client: Client,
    settings: ScrapeSettings,
}

impl RefreshOrchestrator {
    /// Creates an orchestrator with the per-request timeout from settings.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: ScrapeSettings) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Refreshes a batch of keywords and reconciles the retry queue:
    /// failures are enqueued, successes dequeued.
    ///
    /// Providers on the concurrency allowlist scrape the whole batch at
    /// once; everything else runs serially with the configured
    /// inter-request delay as backpressure. Both paths return results in
    /// input order.
    pub async fn refresh(&self, keywords: &[Keyword], queue: &RetryQueue) -> Vec<RefreshResult> {
        let started = Instant::now();
        let provider = self.provider();
        let parallel = provider.is_some_and(|p| PARALLEL_SAFE.contains(&p.id));
        tracing::info!(
            keywords = keywords.len(),
            provider = provider.map_or("direct", |p| p.id),
            parallel,
            "starting refresh batch"
        );

        let results = if parallel {
            self.refresh_parallel(keywords).await
        } else {
            self.refresh_serial(keywords).await
        };

        for result in &results {
            let outcome = if result.is_success() {
                queue.dequeue(result.keyword_id).await
            } else {
                queue.enqueue(result.keyword_id).await
            };
            if let Err(e) = outcome {
                tracing::warn!(keyword_id = result.keyword_id, error = %e, "retry queue update failed");
            }
        }

        tracing::info!(
            keywords = keywords.len(),
            failed = results.iter().filter(|r| !r.is_success()).count(),
            elapsed = ?started.elapsed(),
            "refresh batch completed"
        );
        results
    }

    /// Scrapes one keyword, absorbing any error into the result.
    pub async fn scrape_keyword(&self, keyword: &Keyword) -> RefreshResult {
        let started = Instant::now();
        let outcome = self.scrape(keyword).await;
        match &outcome {
            Ok(success) => tracing::debug!(
                keyword_id = keyword.id,
                position = success.rank.position,
                entries = success.serp.len(),
                elapsed = ?started.elapsed(),
                "scrape completed"
            ),
            Err(e) => tracing::warn!(
                keyword_id = keyword.id,
                error = %e,
                elapsed = ?started.elapsed(),
                "scrape failed"
            ),
        }
        RefreshResult {
            keyword_id: keyword.id,
            keyword: keyword.keyword.clone(),
            outcome: outcome.map_err(Into::into),
        }
    }

    fn provider(&self) -> Option<&'static Provider> {
        // An unknown id is "no provider configured", not an error: the
        // scrape falls through to the direct path.
        self.settings.provider.as_deref().and_then(providers::lookup)
    }

    async fn refresh_serial(&self, keywords: &[Keyword]) -> Vec<RefreshResult> {
        let delay = Duration::from_millis(self.settings.scrape_delay_ms);
        let mut results = Vec::with_capacity(keywords.len());
        let mut is_first = true;
        for keyword in keywords {
            if !is_first && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            is_first = false;
            results.push(self.scrape_keyword(keyword).await);
        }
        results
    }

    async fn refresh_parallel(&self, keywords: &[Keyword]) -> Vec<RefreshResult> {
        // Settle-all: every scrape yields its own result and failures stay
        // local. join_all collects positionally, so output order matches
        // input order regardless of completion order.
        join_all(keywords.iter().map(|kw| self.scrape_keyword(kw))).await
    }

    async fn scrape(&self, keyword: &Keyword) -> Result<ScrapeSuccess, ScrapeError> {
        let provider = self.provider();
        let request = build_scrape_request(keyword, &self.settings, provider)?;
        let body = self.fetch(&request).await?;
        let entries = extract_results(&body, provider, keyword.device)?;
        if entries.is_empty() {
            return Err(ScrapeError::EmptyResults);
        }
        let rank = resolve_rank(&keyword.domain, &entries);
        Ok(ScrapeSuccess {
            rank,
            serp: entries,
        })
    }

    async fn fetch(&self, request: &ScrapeRequest) -> Result<String, ScrapeError> {
        // reqwest fixes the proxy at client construction, so proxied
        // scrapes get a one-off client; the shared one serves the rest.
        let proxied;
        let client = match &request.proxy {
            Some(proxy) => {
                proxied = Client::builder()
                    .timeout(Duration::from_secs(self.settings.request_timeout_secs))
                    .connect_timeout(Duration::from_secs(10))
                    .proxy(reqwest::Proxy::all(proxy)?)
                    .build()?;
                &proxied
            }
            None => &self.client,
        };

        let mut call = client.get(&request.url);
        for (name, value) in &request.headers {
            call = call.header(*name, value.as_str());
        }
        let response = call.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }
        Ok(response.text().await?)
    }
}
