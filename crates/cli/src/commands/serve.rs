//! `serve` command: load the export and run the dashboard until interrupted.

use super::{database_options, open_database, SourceArgs};
use anyhow::Result;
use clap::Args;
use predictoor_core::FileWatcher;
use predictoor_web_api::{ApiServer, AppState};

/// Arguments for the serve command.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Server address (overrides `server.host`/`server.port`)
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Reload the data whenever the CSV file changes
    #[arg(long)]
    pub watch: bool,
}

/// Runs the serve command.
///
/// # Errors
/// Returns an error if the export cannot be loaded or the server fails to bind.
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.source.load_config()?;
    let options = database_options(&config);
    let addr = args.addr.unwrap_or_else(|| config.server.addr());

    tracing::info!("Loading predictions from {}", options.csv_path.display());
    let db = open_database(&options)?;
    let state = AppState::new(db, options);

    let watch_tasks = if args.watch {
        let (watcher, changes) = FileWatcher::new(state.options().csv_path.clone());
        let reload_state = state.clone();

        let watch_task = tokio::spawn(async move {
            if let Err(e) = watcher.watch().await {
                tracing::error!("File watcher stopped: {}", e);
            }
        });
        let reload_task = tokio::spawn(async move { reload_state.reload_on_change(changes).await });
        Some((watch_task, reload_task))
    } else {
        None
    };

    let server = ApiServer::new(state);
    server.serve_with_shutdown(&addr, shutdown_signal()).await?;

    if let Some((watch_task, reload_task)) = watch_tasks {
        // Dropping the receiver with the reload task lets the watcher loop exit.
        reload_task.abort();
        let _ = reload_task.await;
        if let Err(e) = watch_task.await {
            tracing::warn!("File watcher task ended abnormally: {}", e);
        }
    }

    tracing::info!("Dashboard stopped");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to create SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
