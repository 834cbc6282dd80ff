use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DATABASE_ENV: &str = "HASHLINK_DATABASE";
pub const DSN_FILE_ENV: &str = "HASHLINK_DSN_FILE";
pub const LISTEN_ADDR_ENV: &str = "HASHLINK_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "HASHLINK_PUBLIC_BASE_URL";
pub const STORAGE_TIMEOUT_ENV: &str = "HASHLINK_STORAGE_TIMEOUT_MS";
pub const MAX_CONNECTIONS_ENV: &str = "HASHLINK_MAX_CONNECTIONS";
pub const MAX_BODY_BYTES_ENV: &str = "HASHLINK_MAX_BODY_BYTES";
pub const STRICT_NOT_FOUND_ENV: &str = "HASHLINK_STRICT_NOT_FOUND";
pub const LOG_FORMAT_ENV: &str = "HASHLINK_LOG_FORMAT";

pub const DEFAULT_DSN_FILE: &str = "linkFromDB.txt";
pub const DEFAULT_LISTEN_ADDR: &str = "localhost:8080";
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    Postgres,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::InMemory => write!(f, "in-memory"),
            StorageBackend::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "hashlink", about = "A tiny content-addressed URL shortener")]
pub struct Config {
    /// Store links in PostgreSQL instead of process memory.
    #[arg(short = 'd', long, env = DATABASE_ENV)]
    pub database: bool,

    /// File holding the PostgreSQL connection string.
    #[arg(long, env = DSN_FILE_ENV, default_value = DEFAULT_DSN_FILE)]
    pub dsn_file: PathBuf,

    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Prefix of the short links handed out. Defaults to `http://<listen-addr>`.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    /// Deadline for a single storage call, in milliseconds.
    #[arg(long, env = STORAGE_TIMEOUT_ENV, default_value_t = DEFAULT_STORAGE_TIMEOUT_MS)]
    pub storage_timeout_ms: u64,

    #[arg(long, env = MAX_CONNECTIONS_ENV, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    #[arg(long, env = MAX_BODY_BYTES_ENV, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Answer 404 instead of an empty 200 for unknown keys.
    #[arg(long, env = STRICT_NOT_FOUND_ENV)]
    pub strict_not_found: bool,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn storage_backend(&self) -> StorageBackend {
        if self.database {
            StorageBackend::Postgres
        } else {
            StorageBackend::InMemory
        }
    }

    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.clone(),
            None => format!("http://{}", self.listen_addr),
        }
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["hashlink"]).unwrap();

        assert_eq!(config.storage_backend(), StorageBackend::InMemory);
        assert_eq!(config.dsn_file, PathBuf::from("linkFromDB.txt"));
        assert_eq!(config.listen_addr, "localhost:8080");
        assert_eq!(config.public_base_url(), "http://localhost:8080");
        assert_eq!(config.storage_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.max_body_bytes, 65536);
        assert!(!config.strict_not_found);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn short_database_flag_selects_postgres() {
        let config = Config::try_parse_from(["hashlink", "-d"]).unwrap();
        assert_eq!(config.storage_backend(), StorageBackend::Postgres);
        assert_eq!(config.storage_backend().to_string(), "postgres");
    }

    #[test]
    fn explicit_options() {
        let config = Config::try_parse_from([
            "hashlink",
            "--database",
            "--dsn-file",
            "/etc/hashlink/dsn",
            "--listen-addr",
            "0.0.0.0:9000",
            "--public-base-url",
            "https://hl.example",
            "--storage-timeout-ms",
            "250",
            "--strict-not-found",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.dsn_file, PathBuf::from("/etc/hashlink/dsn"));
        assert_eq!(config.public_base_url(), "https://hl.example");
        assert_eq!(config.storage_timeout(), Duration::from_millis(250));
        assert!(config.strict_not_found);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn base_url_follows_listen_addr() {
        let config =
            Config::try_parse_from(["hashlink", "--listen-addr", "127.0.0.1:3000"]).unwrap();
        assert_eq!(config.public_base_url(), "http://127.0.0.1:3000");
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Config::try_parse_from(["hashlink", "--log-format", "xml"]).is_err());
    }
}
