//! Durable retry queue for failed scrapes.
//!
//! A flat, order-preserving, duplicate-free list of keyword IDs persisted
//! as a JSON array. The queue value owns the file: all mutation goes
//! through one async mutex and lands via write-to-temp + atomic rename,
//! so concurrent batches in one process cannot lose updates. There is no
//! priority, no backoff schedule, and no attempt ceiling — an external
//! scheduler replays the whole queue periodically and successful scrapes
//! remove their entry.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("queue file is not a valid JSON id list: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Single-writer owner of the failed-scrape queue file.
pub struct RetryQueue {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RetryQueue {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Adds a keyword ID to the queue. Idempotent: an ID already present
    /// is left where it is.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the queue file cannot be read or written.
    pub async fn enqueue(&self, keyword_id: i64) -> Result<(), QueueError> {
        let _guard = self.lock.lock().await;
        let mut ids = self.read_ids().await?;
        if !ids.contains(&keyword_id) {
            ids.push(keyword_id);
            self.write_ids(&ids).await?;
            tracing::debug!(keyword_id, queued = ids.len(), "keyword added to retry queue");
        }
        Ok(())
    }

    /// Removes a keyword ID from the queue. A no-op when absent.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the queue file cannot be read or written.
    pub async fn dequeue(&self, keyword_id: i64) -> Result<(), QueueError> {
        let _guard = self.lock.lock().await;
        let mut ids = self.read_ids().await?;
        let before = ids.len();
        ids.retain(|id| *id != keyword_id);
        if ids.len() != before {
            self.write_ids(&ids).await?;
            tracing::debug!(keyword_id, queued = ids.len(), "keyword removed from retry queue");
        }
        Ok(())
    }

    /// Returns the queued IDs in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if the queue file cannot be read.
    pub async fn list_all(&self) -> Result<Vec<i64>, QueueError> {
        let _guard = self.lock.lock().await;
        self.read_ids().await
    }

    async fn read_ids(&self) -> Result<Vec<i64>, QueueError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_ids(&self, ids: &[i64]) -> Result<(), QueueError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        // Write to a sibling temp file and rename so readers never observe
        // a half-written queue.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec(ids)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
