use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

/// Port PostgreSQL listens on inside the container.
pub const POSTGRES_PORT: u16 = 5432;

const POSTGRES_IMAGE: &str = "postgres";
const READY_MESSAGE: &str = "database system is ready to accept connections";

/// Settings for a disposable PostgreSQL server. Every field has a default,
/// so `PostgresConfig::builder().build()` is enough for most tests.
#[derive(Debug, Clone, TypedBuilder)]
pub struct PostgresConfig {
    #[builder(default = "16-alpine".to_string(), setter(into))]
    image_tag: String,
    #[builder(default = "hashlink".to_string(), setter(into))]
    database: String,
    #[builder(default = "hashlink".to_string(), setter(into))]
    username: String,
    #[builder(default = "hashlink".to_string(), setter(into))]
    password: String,
}

/// A PostgreSQL container that lives as long as this value.
pub struct PostgresServer {
    container: ContainerAsync<GenericImage>,
    config: PostgresConfig,
}

impl PostgresServer {
    /// Starts the container and waits for the first readiness line.
    ///
    /// The server logs readiness once during initdb and again after the
    /// restart, so callers should still retry their first connection.
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        let container = GenericImage::new(POSTGRES_IMAGE, config.image_tag.as_str())
            .with_exposed_port(POSTGRES_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr(READY_MESSAGE))
            .with_env_var("POSTGRES_DB", config.database.as_str())
            .with_env_var("POSTGRES_USER", config.username.as_str())
            .with_env_var("POSTGRES_PASSWORD", config.password.as_str())
            .start()
            .await?;

        Ok(Self { container, config })
    }

    pub async fn host(&self) -> Result<String> {
        Ok(self.container.get_host().await?.to_string())
    }

    /// Host port mapped to [`POSTGRES_PORT`].
    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(POSTGRES_PORT).await?)
    }

    /// Connection string accepted by `sqlx::PgPool` and by the service's
    /// DSN file.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.config.username, self.config.password, host, port, self.config.database
        ))
    }

    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    /// Returns the underlying container reference.
    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}

impl PostgresConfig {
    pub fn database(&self) -> &str {
        &self.database
    }
}
