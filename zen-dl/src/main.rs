//! zen-dl - Zen Downloader HTTP service
//!
//! Accepts a video URL, runs the external extractor (yt-dlp, which needs
//! ffmpeg for mp3 conversion), and serves the resulting audio file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zen_common::config::{self, CliOverrides, Settings};
use zen_dl::services::{
    tool_runner, ClassificationRule, DownloadService, ExtractorConfig, FsArtifactStore,
    ProcessRunner, StderrClassifier,
};
use zen_dl::{build_router, AppState};

/// Command-line arguments for zen-dl
#[derive(Parser, Debug)]
#[command(name = "zen-dl")]
#[command(about = "Personal audio extractor over HTTP")]
#[command(version)]
struct Args {
    /// Address to bind [env: ZEN_HOST]
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on [env: ZEN_PORT]
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory produced audio files are written to [env: ZEN_DOWNLOADS_DIR]
    #[arg(short, long)]
    downloads_dir: Option<PathBuf>,

    /// Extractor program [env: ZEN_EXTRACTOR]
    #[arg(long)]
    extractor: Option<String>,

    /// Extractor wall-clock timeout in seconds [env: ZEN_TIMEOUT_SECS]
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// TOML config file [env: ZEN_CONFIG]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl From<&Args> for CliOverrides {
    fn from(args: &Args) -> Self {
        CliOverrides {
            host: args.host.clone(),
            port: args.port,
            downloads_dir: args.downloads_dir.clone(),
            extractor: args.extractor.clone(),
            timeout_secs: args.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zen_dl=info,zen_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting Zen Downloader (zen-dl) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml = config::load_config(args.config.as_deref()).context("Failed to load config file")?;
    let settings = Settings::resolve(CliOverrides::from(&args), toml)
        .context("Invalid configuration")?;

    config::ensure_directory_exists(&settings.downloads_dir)
        .context("Failed to create downloads directory")?;
    info!("Downloads directory: {}", settings.downloads_dir.display());

    let runner = Arc::new(ProcessRunner);
    match tool_runner::probe_version(runner.as_ref(), &settings.extractor_program).await {
        Some(version) => info!("Extractor: {} {}", settings.extractor_program, version),
        None => warn!(
            "Extractor '{}' did not respond to --version; downloads will fail until it is installed",
            settings.extractor_program
        ),
    }
    info!("Extractor timeout: {:?}", settings.timeout);

    let classifier = StderrClassifier::with_extra_rules(
        settings.classifier_rules.iter().map(ClassificationRule::from),
    );
    if !settings.classifier_rules.is_empty() {
        info!("Loaded {} extra classifier rules", settings.classifier_rules.len());
    }

    let shutdown = CancellationToken::new();
    let service = DownloadService::new(
        Arc::new(FsArtifactStore::new(settings.downloads_dir.clone())),
        runner,
        ExtractorConfig {
            program: settings.extractor_program.clone(),
            timeout: settings.timeout,
        },
        classifier,
        shutdown.clone(),
    );

    let app = build_router(AppState::new(service));

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel in-flight extractions
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }

    shutdown.cancel();
}
