//! Campaign Sync - Worker Binary
//!
//! This binary starts the queue-driven sync worker, consuming job
//! requests from JetStream and executing them against the local database
//! and the remote campaign platform.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin sync-worker
//!
//! # Run with environment variables
//! WORKER_NATS_URL=nats://queue:4222 DATABASE_URL=postgres://... cargo run --bin sync-worker
//! ```
//!
//! # Environment Variables
//!
//! * `WORKER_NATS_URL` - NATS server URL (default: nats://127.0.0.1:4222)
//! * `WORKER_STREAM_NAME` - JetStream stream name (default: SYNC_JOBS)
//! * `WORKER_SUBJECT` - Job subject (default: sync.jobs)
//! * `WORKER_CONSUMER_NAME` - Durable consumer name (default: sync_worker)
//! * `WORKER_FAILURE_SUBJECT` - Failure report subject (default: sync.failures)
//! * `WORKER_DATABASE_URL` - PostgreSQL connection string
//! * `WORKER_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `REMOTE_CAMPAIGN_URL`, `REMOTE_MEMBER_URL`, `REMOTE_NOTIFICATION_URL`,
//!   `REMOTE_LOGIN`, `REMOTE_PASSWORD`, `REMOTE_API_KEY` - Remote platform access

use std::sync::Arc;

use async_nats::jetstream;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{create_pool_from_url, CampaignRepository, MemberRepository};
use infra_remote::{RemoteConfig, RemotePlatform};
use interface_worker::{Dispatcher, NatsFailureReporter, Operations, WorkerConfig};

/// Main entry point for the sync worker.
///
/// Initializes logging, loads configuration, connects to PostgreSQL and
/// NATS, and runs the dispatcher loop until Ctrl-C or SIGTERM.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.log_level);

    tracing::info!(
        nats_url = %config.nats_url,
        stream = %config.stream_name,
        "Starting Campaign Sync Worker"
    );

    let pool = create_pool_from_url(&config.database_url).await?;

    let remote_config = RemoteConfig::from_env().unwrap_or_default();
    let platform = Arc::new(RemotePlatform::new(&remote_config)?);

    let operations = Operations::new(
        MemberRepository::new(pool.clone()),
        CampaignRepository::new(pool),
        platform,
    );

    let nats_client = async_nats::connect(&config.nats_url).await?;
    let jetstream = jetstream::new(nats_client.clone());
    let reporter = NatsFailureReporter::new(nats_client, config.failure_subject.clone());

    let dispatcher = Dispatcher::new(jetstream, config, operations, reporter);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    dispatcher.run(shutdown_rx).await?;

    tracing::info!("Worker shutdown complete");
    Ok(())
}

/// Loads worker configuration from environment variables.
///
/// Falls back to default values if environment variables are not set.
fn load_config() -> Result<WorkerConfig, Box<dyn std::error::Error>> {
    let config = WorkerConfig::from_env().unwrap_or_else(|_| {
        let defaults = WorkerConfig::default();
        WorkerConfig {
            nats_url: std::env::var("WORKER_NATS_URL").unwrap_or(defaults.nats_url),
            stream_name: std::env::var("WORKER_STREAM_NAME").unwrap_or(defaults.stream_name),
            subject: std::env::var("WORKER_SUBJECT").unwrap_or(defaults.subject),
            consumer_name: std::env::var("WORKER_CONSUMER_NAME").unwrap_or(defaults.consumer_name),
            failure_subject: std::env::var("WORKER_FAILURE_SUBJECT")
                .unwrap_or(defaults.failure_subject),
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("WORKER_DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            log_level: std::env::var("WORKER_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    });

    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
