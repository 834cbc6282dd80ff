use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hashlink_core::{Storage, StorageError};

use crate::config::{Config, DEFAULT_MAX_BODY_BYTES, DEFAULT_STORAGE_TIMEOUT_MS};

#[derive(Clone)]
pub struct AppState {
    storage: Arc<dyn Storage>,
    base_url: String,
    storage_timeout: Duration,
    max_body_bytes: usize,
    strict_not_found: bool,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, public_base_url: impl Into<String>) -> Self {
        Self {
            storage,
            base_url: public_base_url.into(),
            storage_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            strict_not_found: false,
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self::new(storage, config.public_base_url())
            .with_storage_timeout(config.storage_timeout())
            .with_max_body_bytes(config.max_body_bytes)
            .with_strict_not_found(config.strict_not_found)
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn with_strict_not_found(mut self, strict: bool) -> Self {
        self.strict_not_found = strict;
        self
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn strict_not_found(&self) -> bool {
        self.strict_not_found
    }

    /// Runs a storage call under the configured deadline.
    ///
    /// When the deadline passes the call's future is dropped, which cancels
    /// any query still in flight.
    pub async fn with_deadline<T, F>(&self, call: F) -> hashlink_core::Result<T>
    where
        F: Future<Output = hashlink_core::Result<T>>,
    {
        match tokio::time::timeout(self.storage_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(format!(
                "no response within {}ms",
                self.storage_timeout.as_millis()
            ))),
        }
    }
}
