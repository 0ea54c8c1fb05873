//! chunkd daemon entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use chunkd_registry::FileStore;
use chunkd_server::{Config, ServerConfig, UploadServer, UploadService};
use chunkd_transfer::{Coordinator, StagingArea};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(addr = %config.addr, data_dir = %config.data_dir.display(), "starting chunkd");

    let store = Arc::new(FileStore::open(&config.meta_dir())?);
    let staging = StagingArea::open(&config.upload_dir())?;
    let coordinator = Arc::new(Coordinator::new(store, staging));

    let server = UploadServer::new(
        ServerConfig { addr: config.addr },
        UploadService::new(coordinator),
    );

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received");
            server.shutdown();
        }
    }

    Ok(())
}
