//! Documentation of a birthday wish wall.
//!
//! Visitors leave a name, a message and optionally a picture. Everyone sees every
//! wish on one scrolling page, newest first.
//!
//!
//!
//! # Endpoints
//! - `GET /api/wishes` (also `/wishes`): every wish, newest first, cacheable for the read cache TTL
//! - `POST /api/wishes` (also `/wishes`): multipart `name`, `message`, optional `image`,
//!   answers `201`
//! - `GET /api/health`: liveness
//! - `GET /uploads/<file>`: stored pictures, only with the local image backend
//!
//! Anything else on the wishes path answers `405`.
//!
//!
//!
//! # Storage
//!
//! **Goal**: one contract, three places to keep it.
//!
//! - `file`: a JSON array on disk, the default for running on a single box
//! - `memory`: nothing survives a restart, good for demos and tests
//! - `kv`: a Redis list, the one to pick when several instances write at once
//!
//! Reads go through a short-lived snapshot (30 seconds by default) that is dropped
//! as soon as a new wish lands, so the submitter always sees their own wish.
//!
//!
//!
//! # Images
//!
//! Pictures are stored before the wish is. If storing the picture fails the whole
//! submission fails and nothing is written; the visitor simply tries again.
//!
//!
//!
//! # Setup
//!
//! Run with the defaults (file backend, local uploads, port 4000).
//! ```sh
//! cargo run -p wishes
//! ```
//!
//! Run against Redis.
//! ```sh
//! WISHES_BACKEND=kv REDIS_URL=redis://127.0.0.1:6379 cargo run -p wishes
//! ```
//!
//! Post a test wish to a running server.
//! ```sh
//! cargo run -p tester -- --name Ann --message "Happy birthday!"
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    routing::get,
};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod images;
pub mod routes;
pub mod state;
pub mod storage;
pub mod submission;
pub mod utils;

use config::{Config, ImageBackend};
use error::StartupError;
use images::UPLOADS_ROUTE;
use routes::{health_handler, list_handler, method_not_allowed, submit_handler};
use state::AppState;
use submission::MAX_IMAGE_BYTES;

/// Room for the image plus the text fields and multipart framing.
const BODY_LIMIT: usize = MAX_IMAGE_BYTES * 4;
const UPLOADS_MAX_AGE: &str = "public, max-age=86400";

pub async fn start_server() -> Result<(), StartupError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let wishes = get(list_handler)
        .post(submit_handler)
        .fallback(method_not_allowed);

    let mut app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/wishes", wishes.clone())
        .route("/wishes", wishes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT));

    if state.config.image_backend == ImageBackend::Local {
        let uploads = ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                CACHE_CONTROL,
                HeaderValue::from_static(UPLOADS_MAX_AGE),
            ))
            .service(ServeDir::new(&state.config.uploads_dir));

        app = app.nest_service(UPLOADS_ROUTE, uploads);
    }

    app.layer(cors(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .map_err(|_| warn!("Ignoring invalid CORS origin {origin}"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
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
