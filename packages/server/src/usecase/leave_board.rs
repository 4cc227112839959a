//! UseCase: ボードからの退出（明示的な leave-board と切断の両方）
//!
//! 1. この接続が持つロックをすべて解放する
//! 2. ルームから退出する
//! 3. 残りの参加者に user-left を 1 回、解放したロックごとに
//!    lock-update{locked:false} を通知する

use std::sync::Arc;

use crate::infrastructure::dto::websocket::ServerEvent;

use super::{
    board_hub::BoardHub, lock_object::expire_locks, participant::Participant,
    room_router::RoomRouter,
};

pub struct LeaveBoardUseCase {
    hub: Arc<BoardHub>,
    router: Arc<RoomRouter>,
}

impl LeaveBoardUseCase {
    pub fn new(hub: Arc<BoardHub>, router: Arc<RoomRouter>) -> Self {
        Self { hub, router }
    }

    pub async fn execute(&self, participant: &Participant) {
        let board_id = &participant.board_id;
        let connection_id = &participant.connection_id;

        // 参加できた時点でボードは常駐している
        let workspace = self.hub.resident(board_id).await;
        let mut ws = match &workspace {
            Some(workspace) => Some(workspace.lock().await),
            None => None,
        };
        let mut released = Vec::new();
        if let Some(ws) = ws.as_mut() {
            expire_locks(&self.router, board_id, ws, self.hub.now()).await;
            released = ws.locks.release_all(connection_id);
        }

        if let Some(entry) = self.router.leave(board_id, connection_id).await {
            self.router
                .broadcast_to_all(
                    board_id,
                    &ServerEvent::UserLeft {
                        connection_id: entry.connection_id,
                        user_id: entry.user_id,
                    },
                )
                .await;
        }
        for lock in &released {
            self.router
                .broadcast_to_all(board_id, &ServerEvent::unlocked(lock))
                .await;
        }
        drop(ws);

        tracing::info!(
            "Connection '{}' left board '{}' (released {} locks)",
            connection_id,
            board_id,
            released.len()
        );
    }
}
