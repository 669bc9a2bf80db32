//! Webtrail — single-binary browsing-session recorder.
//!
//! Serves the ingest API the companion extension and traffic observer
//! post into; on shutdown, drains in-flight events, finalizes the session,
//! and exports the chronological log.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod intake;
mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("WEBTRAIL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let start_url = match args.get(1).map(String::as_str) {
        Some("--help") | Some("-h") | Some("help") => {
            println!("Webtrail — browsing-session recorder");
            println!();
            println!("Usage: webtrail [url]");
            println!();
            println!("Arguments:");
            println!("  url    Optional start URL; when omitted, the domain is");
            println!("         bound by the first navigation reported to the API");
            return Ok(());
        }
        Some(url) => url.to_string(),
        // Placeholder until the first real navigation binds the domain.
        None => "about:blank".to_string(),
    };

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = webtrail_core::WebtrailConfig::from_env(&data_dir)?;
    let port = config.port;

    let state = Arc::new(AppState::new(config, &start_url));
    match state.store.domain() {
        Some(domain) => info!("Recording for domain: {}", domain),
        None => info!("No start URL provided; domain binds on first navigation"),
    }

    // Start the interaction intake drain task
    let intake_worker = intake::start_intake_worker(state.clone());

    // Build router
    let app = routes::build_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Webtrail ingest server listening on {}", addr);
    info!("Press Ctrl+C to stop and export");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    // Producers have stopped; close the channel and drain what is queued
    // before finalizing, so no in-flight event misses the merge.
    state.close_intake();
    let _ = intake_worker.await;

    info!("Finalizing session...");
    let export = state.store.finalize();

    let folder = webtrail_session::session_dir_name(
        export.session.domain.as_deref(),
        chrono::Local::now(),
    );
    let path = state
        .config
        .data_paths
        .logs
        .join(folder)
        .join("session.json");
    webtrail_session::export_session(&export, &path)?;

    info!(
        "Done: {} event(s) saved to {}",
        export.events.len(),
        path.display()
    );

    Ok(())
}

/// Resolves on SIGINT, SIGTERM, or the stop endpoint.
async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = state.shutdown.notified() => {},
    }

    info!("Stopping recording...");
}
