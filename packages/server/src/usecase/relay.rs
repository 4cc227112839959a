//! UseCase: 描画中ストロークとカーソルの中継
//!
//! どちらも助言的な一時情報なので、ボードの排他区間を通さず
//! 送信元以外の参加者にそのまま転送します。

use std::sync::Arc;

use crate::infrastructure::dto::websocket::{
    CursorMoveRequest, DrawDeltaRequest, DrawStartRequest, ServerEvent,
};

use super::{participant::Participant, room_router::RoomRouter};

pub struct RelayUseCase {
    router: Arc<RoomRouter>,
}

impl RelayUseCase {
    pub fn new(router: Arc<RoomRouter>) -> Self {
        Self { router }
    }

    pub async fn draw_start(&self, participant: &Participant, request: DrawStartRequest) {
        let event = ServerEvent::DrawStart {
            id: request.id,
            x: request.x,
            y: request.y,
            color: request.color,
            stroke_width: request.stroke_width,
            user_id: participant.user_id().clone(),
        };
        self.router
            .broadcast_to_others(&participant.board_id, &participant.connection_id, &event)
            .await;
    }

    pub async fn draw_delta(&self, participant: &Participant, request: DrawDeltaRequest) {
        let event = ServerEvent::DrawDelta {
            id: request.id,
            points: request.points,
            user_id: participant.user_id().clone(),
        };
        self.router
            .broadcast_to_others(&participant.board_id, &participant.connection_id, &event)
            .await;
    }

    /// カーソル位置を記録して他の参加者に通知する
    pub async fn cursor_move(&self, participant: &Participant, request: CursorMoveRequest) {
        let Some(entry) = self
            .router
            .update_cursor(
                &participant.board_id,
                &participant.connection_id,
                request.x,
                request.y,
            )
            .await
        else {
            return;
        };
        let event = ServerEvent::CursorUpdate {
            connection_id: entry.connection_id,
            user_id: entry.user_id,
            cursor: entry.cursor,
        };
        self.router
            .broadcast_to_others(&participant.board_id, &participant.connection_id, &event)
            .await;
    }
}
