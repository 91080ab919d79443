use crate::config::Config;
use crate::jobs::JobRunner;
use crate::state::JobRegistry;
use alacforge_av::{FfmpegTranscoder, Transcoder};
use alacforge_common::Sandbox;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

mod error;
pub mod routes_api;
pub mod routes_sse;

pub use error::ApiError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Job records, shared with every runner
    pub registry: Arc<JobRegistry>,
    pub runner: JobRunner,
}

impl AppContext {
    /// Build the context with an explicit transcoder.
    ///
    /// Canonicalises the input directory (which must exist) and creates the
    /// output directory if needed.
    pub fn with_transcoder(config: Config, transcoder: Arc<dyn Transcoder>) -> Result<Self> {
        let sandbox = Sandbox::new(&config.paths.input_dir).with_context(|| {
            format!("Invalid input directory: {:?}", config.paths.input_dir)
        })?;
        std::fs::create_dir_all(&config.paths.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {:?}",
                config.paths.output_dir
            )
        })?;

        let registry = JobRegistry::new();
        let runner = JobRunner::new(
            Arc::clone(&registry),
            sandbox,
            config.paths.output_dir.clone(),
            transcoder,
        );

        Ok(Self {
            config: Arc::new(config),
            registry,
            runner,
        })
    }

    /// Build the context with ffmpeg as the transcoder.
    pub fn from_config(config: Config) -> Result<Self> {
        let transcoder = Arc::new(FfmpegTranscoder::new(config.tools.ffmpeg_program()));
        Self::with_transcoder(config, transcoder)
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let mut app = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Serve the web UI, falling back to index.html for unknown routes
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        }
    }

    app
}

fn api_routes() -> Router<AppContext> {
    routes_api::api_routes().merge(routes_sse::sse_routes())
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(ctx: AppContext) -> Result<()> {
    let config = Arc::clone(&ctx.config);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = create_router(ctx, config.server.static_dir.clone());

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix. Running jobs are not waited for;
/// their records are lost with the process.
async fn shutdown_signal() {
    #[cfg(unix)]
    let sigterm = async {
        use signal::unix::SignalKind;
        match signal::unix::signal(SignalKind::terminate()) {
            Ok(mut stream) => stream.recv().await,
            Err(e) => {
                tracing::warn!("SIGTERM will not stop the server: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<Option<()>>();

    tokio::select! {
        Ok(()) = signal::ctrl_c() => tracing::info!("Received Ctrl+C, shutting down"),
        Some(()) = sigterm => tracing::info!("Received SIGTERM, shutting down"),
        else => tracing::warn!("Signal handling unavailable, shutting down"),
    }
}
