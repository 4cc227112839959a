//! UseCase: 図形の作成・更新・削除と手描きストロークの確定
//!
//! どの操作もボードの排他区間の中で
//! 「ロック確認 → 変更と op 追加 → 全参加者へ配信 → 保存」の順に進みます。
//! 保存に失敗しても変更と配信は取り消さず、要求元にエラーを返します。

use std::sync::Arc;

use tokio::sync::MutexGuard;

use crate::{
    domain::{ConnectionId, ReleaseOutcome, ShapeChanges, ShapeId, Timestamp},
    infrastructure::dto::websocket::{CreateShapeRequest, DrawEndRequest, ServerEvent},
};

use super::{
    board_hub::{BoardHub, BoardWorkspace},
    error::SessionError,
    lock_object::expire_locks,
    participant::Participant,
    room_router::RoomRouter,
};

pub struct MutateShapeUseCase {
    hub: Arc<BoardHub>,
    router: Arc<RoomRouter>,
}

impl MutateShapeUseCase {
    pub fn new(hub: Arc<BoardHub>, router: Arc<RoomRouter>) -> Self {
        Self { hub, router }
    }

    pub async fn create(
        &self,
        participant: &Participant,
        request: CreateShapeRequest,
    ) -> Result<(), SessionError> {
        let workspace = self.hub.open(&participant.board_id).await?;
        let mut ws = workspace.lock().await;
        let now = self.hub.now();

        let shape = request.into_shape(participant.user_id().clone(), now);
        let op = ws
            .board
            .apply_create(shape, participant.user_id().clone(), now)?;

        self.router
            .broadcast_to_all(&participant.board_id, &ServerEvent::from_op(&op))
            .await;
        self.persist(&ws).await
    }

    /// 手描きストロークを path 図形として確定し、送信元を含む全員に draw-end を返す
    pub async fn draw_end(
        &self,
        participant: &Participant,
        request: DrawEndRequest,
    ) -> Result<(), SessionError> {
        let workspace = self.hub.open(&participant.board_id).await?;
        let mut ws = workspace.lock().await;
        let now = self.hub.now();

        let shape = request.to_shape(participant.user_id().clone(), now);
        let layer = shape.layer.clone();
        ws.board
            .apply_create(shape, participant.user_id().clone(), now)?;

        let event = ServerEvent::DrawEnd {
            id: request.id,
            points: request.points,
            color: request.color,
            stroke_width: request.stroke_width,
            layer,
            user_id: participant.user_id().clone(),
        };
        self.router
            .broadcast_to_all(&participant.board_id, &event)
            .await;
        self.persist(&ws).await
    }

    pub async fn update(
        &self,
        participant: &Participant,
        shape_id: ShapeId,
        changes: ShapeChanges,
    ) -> Result<(), SessionError> {
        let workspace = self.hub.open(&participant.board_id).await?;
        let mut ws = workspace.lock().await;
        let now = self.hub.now();
        expire_locks(&self.router, &participant.board_id, &mut ws, now).await;

        ensure_writable(&mut ws, &shape_id, &participant.connection_id, now)?;
        let op = ws
            .board
            .apply_update(&shape_id, changes, participant.user_id().clone(), now)?;

        self.router
            .broadcast_to_all(&participant.board_id, &ServerEvent::from_op(&op))
            .await;
        self.persist(&ws).await
    }

    /// 図形を削除する。削除者が持っていたロックも解放する
    pub async fn delete(
        &self,
        participant: &Participant,
        shape_id: ShapeId,
    ) -> Result<(), SessionError> {
        let workspace = self.hub.open(&participant.board_id).await?;
        let mut ws = workspace.lock().await;
        let now = self.hub.now();
        expire_locks(&self.router, &participant.board_id, &mut ws, now).await;

        ensure_writable(&mut ws, &shape_id, &participant.connection_id, now)?;
        let op = ws
            .board
            .apply_delete(&shape_id, participant.user_id().clone(), now)?;

        self.router
            .broadcast_to_all(&participant.board_id, &ServerEvent::from_op(&op))
            .await;
        if let ReleaseOutcome::Released(lock) =
            ws.locks
                .release(&shape_id, &participant.connection_id, now)
        {
            self.router
                .broadcast_to_all(&participant.board_id, &ServerEvent::unlocked(&lock))
                .await;
        }
        self.persist(&ws).await
    }

    async fn persist(&self, ws: &MutexGuard<'_, BoardWorkspace>) -> Result<(), SessionError> {
        self.hub
            .persist(&ws.board)
            .await
            .map_err(|e| SessionError::Persistence(e.to_string()))
    }
}

/// 他の接続が有効なロックを持っていれば Conflict
pub(super) fn ensure_writable(
    ws: &mut BoardWorkspace,
    shape_id: &ShapeId,
    connection_id: &ConnectionId,
    now: Timestamp,
) -> Result<(), SessionError> {
    ws.locks
        .ensure_writable(shape_id, connection_id, now)
        .map_err(|holder| SessionError::Conflict {
            object_id: shape_id.clone(),
            locked_by: holder.user_id,
        })
}
