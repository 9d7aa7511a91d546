//! Router construction and server lifecycle.

use axum::Router;
use axum::routing::{get, put};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::handlers;
use crate::config::AppInfo;
use crate::db::Database;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    db: Database,
    info: Arc<AppInfo>,
}

impl AppState {
    pub fn new(db: Database, info: AppInfo) -> Self {
        Self {
            db,
            info: Arc::new(info),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn info(&self) -> &AppInfo {
        &self.info
    }
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/about", get(handlers::about))
        .route("/health", get(handlers::health))
        .route(
            "/v1/task",
            get(handlers::list_tasks).put(handlers::create_task),
        )
        .route("/v1/task/", put(handlers::create_task))
        .route(
            "/v1/task/{id}",
            get(handlers::get_task)
                .post(handlers::upsert_task)
                .delete(handlers::delete_task),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Running server: its bound address and a way to stop it.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            error!("Server task failed: {}", e);
        }
    }
}

/// Bind `host:port` and serve in the background.
///
/// Port 0 binds an ephemeral port; see [`ServerHandle::local_addr`].
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<ServerHandle> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;

    info!("Galaxy server listening on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Galaxy server shutting down");
            })
            .await
        {
            error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
