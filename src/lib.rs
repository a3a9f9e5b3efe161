pub mod commands;
pub mod error;
pub mod models;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use commands::{
    db::{FeedbackStore, SqliteStore},
    feedback::create_feedback,
    health::health,
    logging::request_log,
    settings::{load_server_config, ServerConfig},
};
use error::{PersistenceFailure, StartupError};
use state::AppState;

pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(config.cors_max_age);

    Router::new()
        .route("/health", get(health))
        .route("/api/feedback", post(create_feedback))
        .layer(middleware::from_fn(request_log))
        .layer(cors)
        .with_state(state)
}

pub async fn run() -> Result<(), StartupError> {
    let config = load_server_config().map_err(StartupError::Config)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Opening database...");
    let store = open_store(&config).await?;
    info!("Successfully connected to database!");

    let state = AppState::new(store, config.persistence_timeout);
    let app = build_router(state, &config);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Starting server on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn open_store(config: &ServerConfig) -> Result<Arc<dyn FeedbackStore>, StartupError> {
    let database_path = config.database_path.clone();
    let task = tokio::task::spawn_blocking(move || -> Result<Arc<dyn FeedbackStore>, PersistenceFailure> {
        let store = SqliteStore::open(&database_path)?;
        store.ping()?;
        Ok(Arc::new(store))
    });

    match tokio::time::timeout(config.persistence_timeout, task).await {
        Ok(joined) => Ok(joined.map_err(PersistenceFailure::from)??),
        Err(_) => Err(PersistenceFailure::Timeout(config.persistence_timeout).into()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {e}");
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
