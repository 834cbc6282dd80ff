use std::time::Duration;

use async_trait::async_trait;
use hashlink_core::{Result, ShortKey, Storage, StorageError};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use typed_builder::TypedBuilder;

/// Connection pool sizing for [`PostgresStorage::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct PoolSettings {
    #[builder(default = 10)]
    max_connections: u32,
    /// How long a request may wait for a free connection.
    #[builder(default = Duration::from_secs(5))]
    acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// PostgreSQL implementation of the storage contract.
///
/// Links live in the pre-existing `links` table, keyed by the unique
/// `"shortLink"` column. Writes never overwrite: a conflicting insert is
/// dropped by `ON CONFLICT DO NOTHING`.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Creates a storage from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a storage by opening a new connection pool.
    pub async fn connect(database_url: &str, settings: PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        info!(
            max_connections = settings.max_connections,
            "connected to postgres"
        );
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn put(&self, key: &ShortKey, original_url: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO links ("originalLink", "shortLink")
            VALUES ($1, $2)
            ON CONFLICT ("shortLink") DO NOTHING
            "#,
        )
        .bind(original_url)
        .bind(key.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(
            key = %key,
            inserted = result.rows_affected() > 0,
            "put link"
        );
        Ok(())
    }

    async fn get(&self, key: &ShortKey) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT "originalLink"
            FROM links
            WHERE "shortLink" = $1
            LIMIT 1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let original_url: String = row.try_get("originalLink").map_err(map_sqlx_error)?;
        Ok(Some(original_url))
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("postgres pool closed");
    }
}
