use std::sync::Arc;

use clap::Parser;

use memedb::media::index::list_media;
use memedb::votes::VoteLedger;
use memedb::{cli, config, http};

/// Resolve on the first Ctrl+C or SIGTERM. A second Ctrl+C during the drain exits immediately.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down, draining in-flight requests...");

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nmemedb: forced exit");
            std::process::exit(1);
        }
    });
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();

    let file_config = config::find_config_file(args.config.as_deref()).and_then(|path| {
        match config::load_config(&path) {
            Ok(cfg) => {
                tracing::debug!("Loaded config from {}", path.display());
                Some(cfg)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}", e);
                None
            }
        }
    });

    let config = config::Config::resolve(file_config, &args);

    if let Err(e) = std::fs::create_dir_all(&config.media_dir) {
        eprintln!(
            "error: cannot create media directory {}: {}",
            config.media_dir.display(),
            e
        );
        std::process::exit(1);
    }
    if let Some(dir) = &config.static_dir {
        if !dir.is_dir() {
            eprintln!("error: static directory does not exist: {}", dir.display());
            std::process::exit(1);
        }
    }

    let ledger = Arc::new(VoteLedger::load(&config.votes_file));
    let votes = ledger.snapshot().await;

    tracing::info!("memedb on port {}", config.port);
    tracing::info!("  media directory: {}", config.media_dir.display());
    tracing::info!("  vote ledger:     {} ({} entries)", ledger.path().display(), votes.len());
    if let Some(dir) = &config.static_dir {
        tracing::info!("  static client:   {}", dir.display());
    }
    let media_dir = config.media_dir.clone();
    match tokio::task::spawn_blocking(move || list_media(&media_dir, &votes)).await {
        Ok(Ok(listing)) => tracing::info!("Serving {} media items", listing.count),
        Ok(Err(e)) => tracing::warn!("Initial listing failed: {}", e),
        Err(e) => tracing::warn!("Initial listing task failed: {}", e),
    }

    let state = http::state::AppState {
        media_dir: config.media_dir.clone(),
        ledger,
        max_upload_bytes: config.max_upload_bytes,
        static_dir: config.static_dir.clone(),
    };
    let app = http::build_router(state);

    let host = if config.localhost { "127.0.0.1" } else { "0.0.0.0" };
    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("error: failed to bind {}: {}", addr, e);
            std::process::exit(1);
        });
    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
    {
        tracing::error!("HTTP server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Goodbye.");
}
