//! Collaborative whiteboard server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin shoji-server -- --jwt-secret dev-secret --seed-board demo=alice,bob
//! cargo run --bin shoji-server -- --jwt-secret dev-secret --data-dir ./boards --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use shoji_server::{
    config::ServerConfig,
    domain::{BoardRepository, RepositoryError},
    infrastructure::{
        auth::JwtAuthenticator,
        message_pusher::WebSocketMessagePusher,
        repository::{FileBoardRepository, InMemoryBoardRepository},
    },
    ui::Server,
    usecase::{BoardHub, GetBoardSummaryUseCase, RoomRouter, SessionCoordinator},
};
use shoji_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher / Authenticator
    // 3. Board Hub / Room Router
    // 4. UseCases
    // 5. Server

    // 1. Create Repository
    let repository: Arc<dyn BoardRepository> = match &config.data_dir {
        Some(dir) => {
            let repository = FileBoardRepository::open(dir).await?;
            tracing::info!("Storing boards in {}", repository.root().display());
            Arc::new(repository)
        }
        None => {
            tracing::info!("Storing boards in memory");
            Arc::new(InMemoryBoardRepository::new())
        }
    };
    for seed in &config.seed_boards {
        match repository.load_board(&seed.board_id).await {
            Ok(_) => tracing::info!("Board '{}' already exists", seed.board_id),
            Err(RepositoryError::BoardNotFound(_)) => {
                repository.save_board(&seed.to_board()).await?;
                tracing::info!("Board '{}' created for '{}'", seed.board_id, seed.owner_id);
            }
            Err(e) => return Err(e.into()),
        }
    }

    // 2. Create MessagePusher (WebSocket implementation) and Authenticator
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let authenticator = Arc::new(JwtAuthenticator::new(&config.jwt_secret));

    // 3. Create Board Hub and Room Router
    let hub = Arc::new(BoardHub::new(
        repository,
        Arc::new(SystemClock),
        config.lock_timeout_millis(),
    ));
    let router = Arc::new(RoomRouter::new(message_pusher));

    // 4. Create UseCases
    let session_coordinator = Arc::new(SessionCoordinator::new(
        authenticator,
        hub.clone(),
        router.clone(),
    ));
    let get_board_summary_usecase = Arc::new(GetBoardSummaryUseCase::new(hub, router));

    // 5. Create and run the server
    let server = Server::new(
        session_coordinator,
        get_board_summary_usecase,
        config.lock_sweep_interval(),
    );
    server.run(config.host, config.port).await
}
