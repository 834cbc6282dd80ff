use clap::Parser;
use hashlink_server::bootstrap::{self, shutdown_signal};
use hashlink_server::{telemetry, Config};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    telemetry::init(config.log_format);

    let storage = bootstrap::open_storage(&config)
        .await
        .inspect_err(|e| error!(error = ?e, "could not set up storage"))?;

    bootstrap::serve(&config, storage, shutdown_signal()).await
}
