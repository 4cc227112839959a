//! Session Coordinator: 接続ごとの状態機械とリクエストの振り分け
//!
//! ```text
//! Unjoined ──join 成功──▶ Joined(board) ──leave / 切断──▶ Unjoined
//!    │                        │
//!    └──アクセス拒否──▶ Rejected ◀──別ボードへの join が拒否
//! ```
//!
//! `Joined` 以外の状態では join-board 以外のリクエストを黙って無視します。
//! 失敗はすべて要求元の接続にだけ通知され、接続は維持されます。

use std::sync::Arc;

use crate::{
    domain::{Authenticator, BoardId, ConnectionId, PusherChannel},
    infrastructure::dto::websocket::{ClientEvent, JoinBoardRequest, ServerEvent},
};

use super::{
    board_hub::BoardHub, error::SessionError, join_board::JoinBoardUseCase,
    leave_board::LeaveBoardUseCase, lock_object::LockObjectUseCase,
    mutate_shape::MutateShapeUseCase, participant::Participant, relay::RelayUseCase,
    room_router::RoomRouter, undo::UndoUseCase,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unjoined,
    Joined(Participant),
    /// 直前の join がアクセス拒否された
    Rejected(BoardId),
}

/// 1 接続の状態
#[derive(Debug)]
pub struct Session {
    connection_id: ConnectionId,
    state: SessionState,
}

impl Session {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            state: SessionState::Unjoined,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn participant(&self) -> Option<&Participant> {
        match &self.state {
            SessionState::Joined(participant) => Some(participant),
            _ => None,
        }
    }
}

pub struct SessionCoordinator {
    router: Arc<RoomRouter>,
    join_board: JoinBoardUseCase,
    leave_board: LeaveBoardUseCase,
    mutate_shape: MutateShapeUseCase,
    undo: UndoUseCase,
    lock_object: Arc<LockObjectUseCase>,
    relay: RelayUseCase,
}

impl SessionCoordinator {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        hub: Arc<BoardHub>,
        router: Arc<RoomRouter>,
    ) -> Self {
        Self {
            join_board: JoinBoardUseCase::new(authenticator, hub.clone(), router.clone()),
            leave_board: LeaveBoardUseCase::new(hub.clone(), router.clone()),
            mutate_shape: MutateShapeUseCase::new(hub.clone(), router.clone()),
            undo: UndoUseCase::new(hub.clone(), router.clone()),
            lock_object: Arc::new(LockObjectUseCase::new(hub, router.clone())),
            relay: RelayUseCase::new(router.clone()),
            router,
        }
    }

    /// ロック関連のユースケース（定期掃除タスク用）
    pub fn lock_object_usecase(&self) -> Arc<LockObjectUseCase> {
        self.lock_object.clone()
    }

    /// 新しい接続を登録し、その Session を返す
    pub async fn connect(&self, sender: PusherChannel) -> Session {
        let connection_id = ConnectionId::generate();
        self.router.connect(connection_id, sender).await;
        tracing::info!("Connection '{}' opened", connection_id);
        Session::new(connection_id)
    }

    /// 切断時の後始末（leave と同じ処理の後、送信チャンネルを破棄）
    pub async fn disconnect(&self, session: &mut Session) {
        self.leave(session).await;
        self.router.disconnect(&session.connection_id).await;
        tracing::info!("Connection '{}' closed", session.connection_id);
    }

    /// 1 リクエストを処理する
    pub async fn handle(&self, session: &mut Session, event: ClientEvent) {
        tracing::debug!(
            "Connection '{}' sent '{}'",
            session.connection_id,
            event.name()
        );
        match event {
            ClientEvent::JoinBoard(request) => self.join(session, request).await,
            ClientEvent::LeaveBoard => self.leave(session).await,
            event => {
                let is_lock_request = matches!(event, ClientEvent::LockObject(_));
                let result = match session.participant() {
                    Some(participant) => self.dispatch(participant, event).await,
                    None => Err(SessionError::NotJoined),
                };
                if let Err(e) = result {
                    self.report(session.connection_id, e, is_lock_request)
                        .await;
                }
            }
        }
    }

    async fn join(&self, session: &mut Session, request: JoinBoardRequest) {
        self.leave(session).await;

        let board_id = request.board_id.clone();
        match self
            .join_board
            .execute(
                session.connection_id,
                request.board_id,
                request.token.as_deref(),
            )
            .await
        {
            Ok(participant) => session.state = SessionState::Joined(participant),
            Err(e) => {
                if matches!(e, SessionError::AccessDenied(_)) {
                    session.state = SessionState::Rejected(board_id);
                }
                self.report(session.connection_id, e, false).await;
            }
        }
    }

    async fn leave(&self, session: &mut Session) {
        let state = std::mem::replace(&mut session.state, SessionState::Unjoined);
        if let SessionState::Joined(participant) = state {
            self.leave_board.execute(&participant).await;
        }
    }

    async fn dispatch(
        &self,
        participant: &Participant,
        event: ClientEvent,
    ) -> Result<(), SessionError> {
        match event {
            ClientEvent::DrawStart(request) => {
                self.relay.draw_start(participant, request).await;
                Ok(())
            }
            ClientEvent::DrawDelta(request) => {
                self.relay.draw_delta(participant, request).await;
                Ok(())
            }
            ClientEvent::CursorMove(request) => {
                self.relay.cursor_move(participant, request).await;
                Ok(())
            }
            ClientEvent::DrawEnd(request) => self.mutate_shape.draw_end(participant, request).await,
            ClientEvent::CreateShape(request) => {
                self.mutate_shape.create(participant, request).await
            }
            ClientEvent::UpdateShape(request) => {
                self.mutate_shape
                    .update(participant, request.shape_id, request.changes)
                    .await
            }
            ClientEvent::DeleteShape(request) => {
                self.mutate_shape
                    .delete(participant, request.shape_id)
                    .await
            }
            ClientEvent::Undo => self.undo.execute(participant).await,
            ClientEvent::LockObject(request) => {
                self.lock_object.lock(participant, request.object_id).await
            }
            ClientEvent::UnlockObject(request) => {
                self.lock_object
                    .unlock(participant, request.object_id)
                    .await
            }
            ClientEvent::JoinBoard(_) | ClientEvent::LeaveBoard => Ok(()),
        }
    }

    /// 失敗を要求元にだけ通知する
    async fn report(&self, connection_id: ConnectionId, error: SessionError, is_lock_request: bool) {
        let event = match error {
            SessionError::NotJoined => {
                tracing::debug!(
                    "Ignoring request from '{}': not joined to a board",
                    connection_id
                );
                return;
            }
            SessionError::Conflict {
                object_id,
                locked_by,
            } if is_lock_request => ServerEvent::LockFailed {
                object_id,
                locked_by,
            },
            other => {
                tracing::warn!("Request from '{}' failed: {}", connection_id, other);
                ServerEvent::error(other.to_string())
            }
        };
        self.router.send_to(&connection_id, &event).await;
    }
}
