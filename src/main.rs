use cabhail::application::service::CabService;
use cabhail::config::Cli;
use cabhail::infrastructure::open_store;
use cabhail::interfaces::http::{AppState, build_router};
use cabhail::observability::init_tracing;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let store = open_store(cli.db_path.as_deref()).into_diagnostic()?;
    let settings = cli.settings();
    tracing::info!(
        store_timeout_ms = settings.store_timeout.as_millis() as u64,
        code_ttl_secs = ?settings.code_ttl.map(|ttl| ttl.as_secs()),
        create_policy = ?settings.create_policy,
        "resolved engine settings"
    );

    if cli.dry_run {
        return Ok(());
    }

    let state = AppState {
        service: Arc::new(CabService::new(store, settings)),
    };
    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .into_diagnostic()?;
    tracing::info!(addr = %cli.bind, "server listening");
    axum::serve(listener, build_router(state))
        .await
        .into_diagnostic()?;

    Ok(())
}
