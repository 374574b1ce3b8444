//! HTTP server
//!
//! Builds the axum application out of the per-area routers, attaches the
//! socket.io layer, CORS and request logging, starts the background tasks and
//! serves until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use socketioxide::layer::SocketIoLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::api;
use crate::auth;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, ServerState};
use crate::events::SocketFanout;
use crate::orders::AutoCompleteSweeper;

pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.state.config().clone();

        let mut tasks = BackgroundTasks::new();
        let (socket_layer, fanout) = SocketFanout::new_layer();
        tasks.spawn(
            "socket_fanout",
            TaskKind::Listener,
            fanout.forward_events(self.state.bus().clone(), tasks.shutdown_token()),
        );

        let sweeper = AutoCompleteSweeper::new(
            self.state.orders().clone(),
            Arc::clone(self.state.lifecycle()),
            config.sweep_interval(),
            config.auto_complete_after(),
        );
        tasks.spawn(
            "auto_complete_sweeper",
            TaskKind::Periodic,
            sweeper.run(tasks.shutdown_token()),
        );

        let app = build_app(self.state, socket_layer);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, environment = %config.environment, "Server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tasks.shutdown().await;
        Ok(())
    }
}

/// Assemble the full application router
pub fn build_app(state: ServerState, socket_layer: SocketIoLayer) -> Router {
    let files_dir = state.images().dir().to_path_buf();

    Router::new()
        .merge(api::health::router())
        .merge(api::products::router())
        .merge(api::categories::router())
        .merge(api::orders::router())
        .merge(api::delivery_taxes::router())
        .merge(api::expenses::router())
        .merge(api::dashboard::router())
        .merge(api::payments::router())
        .nest_service("/files", ServeDir::new(files_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(middleware::from_fn(log_request))
        .layer(cors_layer(state.config()))
        .layer(socket_layer)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_origin {
        Some(origin) => match origin.parse::<http::HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                tracing::warn!(origin, "Invalid CORS_ORIGIN, allowing any origin");
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    }
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    info!(
        %method,
        %uri,
        status = %response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
