//! textintel - HTTP API and job worker for summarize / qa / rewrite

use clap::{Parser, Subcommand, ValueEnum};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod state;
mod wiring;

use state::AppState;
use textintel_core::app::WorkerGroup;
use textintel_core::config::{Config, StoreBackend};

const DEFAULT_LOG_FILTER: &str = "textintel_server=debug,textintel_core=debug,tower_http=debug";

/// Text intelligence API: summarization, question answering and tone rewriting.
#[derive(Parser)]
#[command(name = "textintel", version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tracing filter directives
    #[arg(long, global = true, env = "RUST_LOG")]
    log_filter: Option<String>,

    /// Store backend (overrides STORE_BACKEND)
    #[arg(long, global = true, value_enum)]
    store: Option<Backend>,

    /// Redis URL (overrides REDIS_URL)
    #[arg(long, global = true)]
    redis_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to (overrides TEXTINTEL_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on (overrides TEXTINTEL_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Workers to run inside the API process.
        /// Defaults to 0 with redis and WORKER_CONCURRENCY with the memory store.
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Run job workers against the shared store
    Worker {
        /// Concurrent jobs (overrides WORKER_CONCURRENCY)
        #[arg(short, long)]
        concurrency: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Redis,
    Memory,
}

impl From<Backend> for StoreBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Redis => StoreBackend::Redis,
            Backend::Memory => StoreBackend::Memory,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = cli.log_filter.clone().unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(store) = cli.store {
        config.store_backend = store.into();
    }
    if let Some(url) = cli.redis_url {
        config.redis_url = url;
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            workers,
        } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            let workers = workers.unwrap_or(match config.store_backend {
                StoreBackend::Redis => 0,
                StoreBackend::Memory => config.worker_concurrency,
            });
            serve(config, workers).await
        }
        Commands::Worker { concurrency } => {
            if let Some(n) = concurrency {
                config.worker_concurrency = n.max(1);
            }
            if config.store_backend == StoreBackend::Memory {
                warn!("worker with the memory store only sees its own jobs; use `serve --workers` instead");
            }
            work(config).await
        }
    }
}

async fn serve(config: Config, workers: usize) -> anyhow::Result<()> {
    info!("Starting textintel API");
    let app = wiring::build_app(&config)?;

    let group = (workers > 0).then(|| WorkerGroup::spawn(workers, app.worker.clone()));
    if group.is_none() && config.store_backend == StoreBackend::Memory {
        warn!("memory store without embedded workers: submitted jobs will stay queued");
    }

    let router = api::create_router(AppState::new(&app));
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(group) = group {
        info!("waiting for in-flight jobs");
        group.shutdown_and_join().await;
    }
    Ok(())
}

async fn work(config: Config) -> anyhow::Result<()> {
    let app = wiring::build_app(&config)?;
    let group = WorkerGroup::spawn(config.worker_concurrency, app.worker.clone());
    info!(concurrency = config.worker_concurrency, "worker ready. Press Ctrl+C to stop.");

    shutdown_signal().await;
    group.shutdown_and_join().await;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
