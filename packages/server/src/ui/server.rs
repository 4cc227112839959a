//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{GetBoardSummaryUseCase, SessionCoordinator, spawn_lock_sweeper};

use super::{
    handler::{get_board_summary, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Collaborative whiteboard server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(session_coordinator, get_board_summary_usecase, sweep_interval);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// SessionCoordinator（接続ごとのリクエスト処理）
    session_coordinator: Arc<SessionCoordinator>,
    /// GetBoardSummaryUseCase（ボード状態取得のユースケース）
    get_board_summary_usecase: Arc<GetBoardSummaryUseCase>,
    /// 期限切れロックの掃除間隔
    lock_sweep_interval: Duration,
}

impl Server {
    pub fn new(
        session_coordinator: Arc<SessionCoordinator>,
        get_board_summary_usecase: Arc<GetBoardSummaryUseCase>,
        lock_sweep_interval: Duration,
    ) -> Self {
        Self {
            session_coordinator,
            get_board_summary_usecase,
            lock_sweep_interval,
        }
    }

    /// Build the axum router.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            session_coordinator: self.session_coordinator.clone(),
            get_board_summary_usecase: self.get_board_summary_usecase.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/boards/{board_id}", get(get_board_summary))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind to `host:port` and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let sweeper = spawn_lock_sweeper(
            self.session_coordinator.lock_object_usecase(),
            self.lock_sweep_interval,
        );

        tracing::info!(
            "Whiteboard server listening on {}",
            listener.local_addr()?
        );

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        sweeper.abort();
        result?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
