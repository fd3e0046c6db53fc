use account_service::{
    config::Settings,
    grpc::{proto::account_service::account_service_server::AccountServiceServer, AccountDirectoryServer},
    security::CredentialHasher,
    services::{spawn_event_publisher, AccountDirectory, EventPublisher, KafkaEventSink},
    store::{PgRecordBackend, RecordStore},
};
use anyhow::{Context, Result};
use crypto_core::grpc_correlation::ensure_correlation_id;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "account_service=info,info".into()),
        )
        .with_target(false)
        .json()
        .init();

    info!("Starting Account Service");

    let settings = Settings::load().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    // An unreachable database at startup is fatal
    let db_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout))
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(
        "Database pool initialized with {} max connections",
        settings.database.max_connections
    );

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let store = RecordStore::new(
        Arc::new(PgRecordBackend::new(db_pool.clone())),
        settings.database.operation_deadline(),
    );

    let hasher = CredentialHasher::new(settings.password.cost())
        .context("Failed to initialize password hasher")?;

    let (events, publisher_handle) = if settings.kafka.is_enabled() {
        match KafkaEventSink::new(
            &settings.kafka.bootstrap_servers(),
            &settings.kafka.topic,
            settings.kafka.partition,
            Duration::from_secs(settings.kafka.producer_timeout),
        ) {
            Ok(sink) => {
                info!(topic = %sink.topic(), "Kafka event sink initialized");
                let (publisher, handle) =
                    spawn_event_publisher(Arc::new(sink), settings.kafka.publisher_config());
                (publisher, Some(handle))
            }
            Err(err) => {
                error!("Failed to initialize Kafka producer: {:?}", err);
                (EventPublisher::disabled(), None)
            }
        }
    } else {
        info!("Kafka brokers not configured; running without event publishing");
        (EventPublisher::disabled(), None)
    };

    let directory = AccountDirectory::new(store, hasher, events);
    let account_service = AccountDirectoryServer::new(directory);

    let (mut health, health_service) = health_reporter();
    health
        .set_serving::<AccountServiceServer<AccountDirectoryServer>>()
        .await;

    let addr: std::net::SocketAddr = settings
        .server
        .grpc_addr()
        .parse()
        .context("Invalid server address")?;

    info!("Starting gRPC server on {}", addr);

    Server::builder()
        .add_service(health_service)
        .add_service(AccountServiceServer::with_interceptor(
            account_service,
            ensure_correlation_id,
        ))
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .context("gRPC server error")?;

    // The server owned the last publisher handles; let the worker drain
    if let Some(handle) = publisher_handle {
        if tokio::time::timeout(Duration::from_secs(5), handle).await.is_err() {
            warn!("Event publisher did not drain before shutdown");
        }
    }

    db_pool.close().await;
    info!("Account service shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutting down gracefully...");
}
