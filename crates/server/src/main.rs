use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use valet_core::{
    create_audit_system, create_scorer, load_config, validate_config, AuditEvent, AuditStore,
    Config, Database, GateRegistry, LoggingConfig, SqliteAuditStore, SqliteGateRegistry,
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
};
use valet_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Config failures happen before the subscriber is installed
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

/// `VALET_CONFIG` when set, else `config.toml` if present, else defaults.
fn config_path() -> Option<PathBuf> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            default.exists().then_some(default)
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let fmt_layer = if logging.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn config_hash(config: &Config) -> String {
    let config_json = serde_json::to_string(config).unwrap_or_default();
    let digest = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    digest[..16].to_string()
}

async fn run() -> Result<()> {
    let path = config_path();
    let config = load_config(path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config.logging);

    match &path {
        Some(path) => info!("Configuration loaded from {:?}", path),
        None => info!("No config file found, using defaults"),
    }
    info!("Database path: {:?}", config.database.path);
    info!(
        "Dispatch threshold: {}, scorer: {:?}",
        config.dispatch.confidence_threshold, config.dispatch.scorer
    );

    let database = Database::open(&config.database.path)
        .with_context(|| format!("Failed to open database {:?}", config.database.path))?;

    let seeded = SqliteGateRegistry::new(database.clone())
        .seed_defaults(&config.gates.defaults)
        .context("Failed to seed gate registry")?;
    if seeded > 0 {
        info!("Seeded {} default gates", seeded);
    }

    // Create audit system
    let audit_store: Arc<dyn AuditStore> = Arc::new(SqliteAuditStore::new(database.clone()));
    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);
    let writer_handle = tokio::spawn(audit_writer.run());

    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash(&config),
        })
        .await;
    info!("Emitted ServiceStarted audit event");

    let scorer = create_scorer(config.dispatch.scorer);
    info!("Using gate scorer: {}", scorer.name());

    let state = Arc::new(AppState::new(
        config.clone(),
        database.clone(),
        scorer,
        audit_handle.clone(),
        audit_store,
    ));
    let app = create_router(Arc::clone(&state));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // The writer exits once every AuditHandle clone is gone; the state and
    // its engine hold clones too.
    drop(state);
    drop(audit_handle);

    let _ = writer_handle.await;
    info!("Audit writer stopped");

    match database.close() {
        Ok(true) => info!("Database closed"),
        Ok(false) => info!("Database still shared, leaving open"),
        Err(e) => error!("Failed to close database: {}", e),
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
