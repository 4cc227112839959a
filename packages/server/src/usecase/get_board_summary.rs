//! UseCase: 常駐ボードの状態取得（デバッグ用 HTTP API）

use std::sync::Arc;

use crate::domain::{Board, BoardId, Lock, PresenceEntry};

use super::{board_hub::BoardHub, room_router::RoomRouter};

/// ある時点のボードの状態
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub board: Board,
    pub locks: Vec<Lock>,
    pub participants: Vec<PresenceEntry>,
}

pub struct GetBoardSummaryUseCase {
    hub: Arc<BoardHub>,
    router: Arc<RoomRouter>,
}

impl GetBoardSummaryUseCase {
    pub fn new(hub: Arc<BoardHub>, router: Arc<RoomRouter>) -> Self {
        Self { hub, router }
    }

    /// 常駐していないボードは `None`（ストアからは読み込まない）
    pub async fn execute(&self, board_id: &BoardId) -> Option<BoardSnapshot> {
        let workspace = self.hub.resident(board_id).await?;
        let (board, locks) = {
            let mut ws = workspace.lock().await;
            let now = self.hub.now();
            let locks = ws.locks.active(now);
            (ws.board.clone(), locks)
        };
        let participants = self.router.presence_snapshot(board_id).await;
        Some(BoardSnapshot {
            board,
            locks,
            participants,
        })
    }
}
