//! Command-line and environment configuration.

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;

use crate::domain::{Board, BoardId, UserId};

#[derive(Parser, Debug, Clone)]
#[command(name = "shoji-server")]
#[command(about = "Real-time collaborative whiteboard server", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "SHOJI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "SHOJI_PORT", default_value = "8080")]
    pub port: u16,

    /// Directory of JSON board documents (in-memory store when unset)
    #[arg(long, env = "SHOJI_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// HS256 secret used to verify join tokens
    #[arg(long, env = "SHOJI_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Seconds a lock lives before it expires
    #[arg(
        long,
        env = "SHOJI_LOCK_TIMEOUT_SECS",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub lock_timeout_secs: u64,

    /// Seconds between sweeps for expired locks
    #[arg(
        long,
        env = "SHOJI_LOCK_SWEEP_INTERVAL_SECS",
        default_value = "60",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub lock_sweep_interval_secs: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Board to create at startup if missing: `<boardId>=<ownerId>[,<allowedUserId>...]`
    #[arg(long = "seed-board", env = "SHOJI_SEED_BOARDS", value_delimiter = ';')]
    pub seed_boards: Vec<BoardSeed>,
}

impl ServerConfig {
    pub fn lock_timeout_millis(&self) -> i64 {
        i64::try_from(self.lock_timeout_secs.saturating_mul(1_000)).unwrap_or(i64::MAX)
    }

    pub fn lock_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.lock_sweep_interval_secs)
    }
}

/// An empty board to create at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSeed {
    pub board_id: BoardId,
    pub owner_id: UserId,
    pub allowed_users: Vec<UserId>,
}

impl BoardSeed {
    pub fn to_board(&self) -> Board {
        Board::new(self.board_id.clone(), self.owner_id.clone())
            .with_allowed_users(self.allowed_users.clone())
    }
}

impl FromStr for BoardSeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (board, users) = s
            .split_once('=')
            .ok_or_else(|| format!("expected <boardId>=<ownerId>[,...], got '{s}'"))?;
        let board_id = BoardId::new(board.trim().to_string()).map_err(|e| e.to_string())?;

        let mut users = users
            .split(',')
            .map(|user| UserId::new(user.trim().to_string()).map_err(|e| e.to_string()));
        let owner_id = users
            .next()
            .ok_or_else(|| format!("board '{board_id}' needs an owner"))??;
        let allowed_users = users.collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            board_id,
            owner_id,
            allowed_users,
        })
    }
}
