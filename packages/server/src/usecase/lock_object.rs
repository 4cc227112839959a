//! UseCase: オブジェクトのロック取得・解放と期限切れロックの掃除

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use crate::{
    domain::{AcquireOutcome, BoardId, ReleaseOutcome, ShapeId, Timestamp},
    infrastructure::dto::websocket::ServerEvent,
};

use super::{
    board_hub::{BoardHub, BoardWorkspace},
    error::SessionError,
    participant::Participant,
    room_router::RoomRouter,
};

pub struct LockObjectUseCase {
    hub: Arc<BoardHub>,
    router: Arc<RoomRouter>,
}

impl LockObjectUseCase {
    pub fn new(hub: Arc<BoardHub>, router: Arc<RoomRouter>) -> Self {
        Self { hub, router }
    }

    /// ロックを取得し、全員に lock-update{locked:true} を通知する
    ///
    /// 他の接続が保持中なら `SessionError::Conflict`（要求元にだけ lock-failed）。
    pub async fn lock(
        &self,
        participant: &Participant,
        object_id: ShapeId,
    ) -> Result<(), SessionError> {
        let workspace = self.hub.open(&participant.board_id).await?;
        let mut ws = workspace.lock().await;
        let now = self.hub.now();
        expire_locks(&self.router, &participant.board_id, &mut ws, now).await;

        match ws
            .locks
            .acquire(&object_id, participant.lock_holder(), now)
        {
            AcquireOutcome::Granted(lock) => {
                self.router
                    .broadcast_to_all(&participant.board_id, &ServerEvent::locked(&lock))
                    .await;
                Ok(())
            }
            AcquireOutcome::Denied(holder) => {
                tracing::debug!(
                    "Lock on '{}' denied to '{}': held by '{}'",
                    object_id,
                    participant.connection_id,
                    holder.connection_id
                );
                Err(SessionError::Conflict {
                    object_id,
                    locked_by: holder.user_id,
                })
            }
        }
    }

    /// 自分のロックなら解放し、全員に lock-update{locked:false} を通知する
    pub async fn unlock(
        &self,
        participant: &Participant,
        object_id: ShapeId,
    ) -> Result<(), SessionError> {
        let workspace = self.hub.open(&participant.board_id).await?;
        let mut ws = workspace.lock().await;
        let now = self.hub.now();
        expire_locks(&self.router, &participant.board_id, &mut ws, now).await;

        if let ReleaseOutcome::Released(lock) =
            ws.locks
                .release(&object_id, &participant.connection_id, now)
        {
            self.router
                .broadcast_to_all(&participant.board_id, &ServerEvent::unlocked(&lock))
                .await;
        }
        Ok(())
    }

    /// 全常駐ボードの期限切れロックを掃除し、解放を通知する
    ///
    /// 掃除したロックの数を返します。
    pub async fn sweep(&self) -> usize {
        let now = self.hub.now();
        let mut count = 0;
        for (board_id, workspace) in self.hub.resident_boards().await {
            let mut ws = workspace.lock().await;
            count += expire_locks(&self.router, &board_id, &mut ws, now).await;
        }
        if count > 0 {
            tracing::info!("Expired {} stale locks", count);
        }
        count
    }
}

/// 期限切れのロックを取り除き、全員に lock-update{locked:false} を通知する
///
/// ボードの排他区間の中で呼び出します。取り除いたロックの数を返します。
pub(super) async fn expire_locks(
    router: &RoomRouter,
    board_id: &BoardId,
    ws: &mut BoardWorkspace,
    now: Timestamp,
) -> usize {
    let expired = ws.locks.expire_stale(now);
    for lock in &expired {
        router
            .broadcast_to_all(board_id, &ServerEvent::unlocked(lock))
            .await;
    }
    expired.len()
}

/// 一定間隔で [`LockObjectUseCase::sweep`] を実行するタスクを起動
pub fn spawn_lock_sweeper(usecase: Arc<LockObjectUseCase>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // 最初の tick は即座に完了する
        ticker.tick().await;
        loop {
            ticker.tick().await;
            usecase.sweep().await;
        }
    })
}
