//! UseCase: ボードへの参加
//!
//! 1. トークンを検証する（無ければゲスト）
//! 2. ボードを開き、所有者または許可ユーザーかを確認する
//! 3. ルームに参加し、参加者にボード状態と参加者一覧を送る
//! 4. 他の参加者に参加を通知する
//!
//! 3 と 4 はボードの排他区間の中で行うため、参加者はスナップショットより
//! 古い変更イベントを受け取りません。

use std::sync::Arc;

use crate::{
    domain::{Authenticator, BoardId, ConnectionId, Identity},
    infrastructure::dto::websocket::ServerEvent,
};

use super::{
    board_hub::BoardHub, error::SessionError, lock_object::expire_locks,
    participant::Participant, room_router::RoomRouter,
};

pub struct JoinBoardUseCase {
    authenticator: Arc<dyn Authenticator>,
    hub: Arc<BoardHub>,
    router: Arc<RoomRouter>,
}

impl JoinBoardUseCase {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        hub: Arc<BoardHub>,
        router: Arc<RoomRouter>,
    ) -> Self {
        Self {
            authenticator,
            hub,
            router,
        }
    }

    /// 参加を実行
    ///
    /// 成功時は参加中の接続を返します。
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        board_id: BoardId,
        token: Option<&str>,
    ) -> Result<Participant, SessionError> {
        let identity = match token {
            Some(token) => self
                .authenticator
                .verify(token)
                .await
                .map_err(|e| SessionError::from_auth(&board_id, e))?,
            None => Identity::guest(&connection_id),
        };

        let workspace = self.hub.open(&board_id).await?;
        let mut ws = workspace.lock().await;

        if identity.is_guest || !ws.board.can_access(&identity.user_id) {
            tracing::warn!(
                "User '{}' denied access to board '{}'",
                identity.user_id,
                board_id
            );
            return Err(SessionError::access_denied(&board_id));
        }

        let now = self.hub.now();
        expire_locks(&self.router, &board_id, &mut ws, now).await;

        let joined = self.router.join(&board_id, connection_id, &identity).await;
        if let Some((prior, entry)) = joined.left {
            self.router
                .broadcast_to_all(
                    &prior,
                    &ServerEvent::UserLeft {
                        connection_id: entry.connection_id,
                        user_id: entry.user_id,
                    },
                )
                .await;
        }

        let board_state = ServerEvent::BoardState {
            board_id: board_id.clone(),
            shapes: ws.board.shapes().to_vec(),
            ops: ws.board.ops().to_vec(),
            locks: ws.locks.active(now),
        };
        self.router.send_to(&connection_id, &board_state).await;

        let presence = self.router.presence_snapshot(&board_id).await;
        self.router
            .send_to(&connection_id, &ServerEvent::PresenceState(presence))
            .await;

        self.router
            .broadcast_to_others(&board_id, &connection_id, &ServerEvent::UserJoined(joined.entry))
            .await;
        drop(ws);

        tracing::info!(
            "Connection '{}' joined board '{}' as '{}'",
            connection_id,
            board_id,
            identity.user_id
        );
        Ok(Participant {
            connection_id,
            board_id,
            identity,
        })
    }
}
