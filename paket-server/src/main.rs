use std::net::Ipv4Addr;
use std::sync::Arc;

use clap::Parser;
use paket_core::{spawn_expiry, ArticleStore, ExpiryConfig, HttpTitleSource};
use paket_server::cli::Args;
use paket_server::{init_tracing, router, AppState};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = Arc::new(args.into_config());
    let store = ArticleStore::open(&config.db, config.ttl()).await?;
    let expiry = spawn_expiry(store.clone(), ExpiryConfig::default());

    let state = AppState {
        store,
        config: config.clone(),
        titles: Arc::new(HttpTitleSource::new()?),
    };

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port)).await?;
    info!(?config, "serving");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    expiry.stop().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
