use crate::error::Result;
use crate::short_key::ShortKey;
use async_trait::async_trait;

/// A key/value store for shortened links.
///
/// Every backend implements the same insert-or-ignore contract, so the
/// service behaves identically whichever one it is wired to.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Stores `original_url` under `key` if the key is absent.
    ///
    /// An existing mapping is left untouched: the first write wins and later
    /// writes for the same key are silently ignored.
    async fn put(&self, key: &ShortKey, original_url: &str) -> Result<()>;

    /// Retrieves the URL stored under `key`.
    /// Returns `None` if the key does not exist.
    async fn get(&self, key: &ShortKey) -> Result<Option<String>>;

    /// Releases backend resources. Called once at shutdown.
    async fn close(&self);
}
