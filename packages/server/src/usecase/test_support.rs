//! ユースケースのテスト用ハーネス
//!
//! ボード `b1`（所有者 alice、許可ユーザー bob と carol）と `b2`（所有者 bob）を
//! 登録したインメモリ Repository、手動で進める時計、
//! トークン = ユーザー ID として扱う認証器で SessionCoordinator を組み立てます。

use std::sync::Arc;

use shoji_shared::time::ManualClock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        AuthError, Board, BoardId, BoardRepository, DEFAULT_LOCK_TIMEOUT_MILLIS, Identity,
        MockAuthenticator, ShapeId, ShapeType, UserId,
    },
    infrastructure::{
        dto::websocket::{ClientEvent, CreateShapeRequest, JoinBoardRequest, ServerEvent},
        message_pusher::WebSocketMessagePusher,
        repository::InMemoryBoardRepository,
    },
};

use super::{BoardHub, RoomRouter, Session, SessionCoordinator};

pub const START_MILLIS: i64 = 1_700_000_000_000;

pub fn board_id(s: &str) -> BoardId {
    BoardId::new(s.to_string()).unwrap()
}

pub fn user_id(s: &str) -> UserId {
    UserId::new(s.to_string()).unwrap()
}

pub fn shape_id(s: &str) -> ShapeId {
    ShapeId::new(s.to_string()).unwrap()
}

pub fn seeded_repository() -> InMemoryBoardRepository {
    InMemoryBoardRepository::with_boards([
        Board::new(board_id("b1"), user_id("alice"))
            .with_allowed_users(vec![user_id("bob"), user_id("carol")]),
        Board::new(board_id("b2"), user_id("bob")),
    ])
}

/// トークン文字列をそのままユーザー ID とみなす。"bad" は不正なトークン
pub fn token_authenticator() -> MockAuthenticator {
    let mut authenticator = MockAuthenticator::new();
    authenticator.expect_verify().returning(|token| {
        if token == "bad" {
            return Err(AuthError::InvalidToken("bad signature".to_string()));
        }
        Ok(Identity::authenticated(
            user_id(token),
            token.to_uppercase(),
            None,
        ))
    });
    authenticator
}

pub struct Harness {
    pub hub: Arc<BoardHub>,
    pub router: Arc<RoomRouter>,
    pub clock: Arc<ManualClock>,
    pub coordinator: SessionCoordinator,
}

/// 接続 1 本分（Session と受信チャンネル）
pub struct Client {
    pub session: Session,
    rx: mpsc::UnboundedReceiver<String>,
}

impl Client {
    /// 受信済みのイベントをすべて取り出す
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            events.push(serde_json::from_str(&frame).unwrap());
        }
        events
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_repository(Arc::new(seeded_repository()))
    }

    pub fn with_repository(repository: Arc<dyn BoardRepository>) -> Self {
        let clock = Arc::new(ManualClock::new(START_MILLIS));
        let hub = Arc::new(BoardHub::new(
            repository,
            clock.clone(),
            DEFAULT_LOCK_TIMEOUT_MILLIS,
        ));
        let router = Arc::new(RoomRouter::new(Arc::new(WebSocketMessagePusher::new())));
        let coordinator =
            SessionCoordinator::new(Arc::new(token_authenticator()), hub.clone(), router.clone());
        Self {
            hub,
            router,
            clock,
            coordinator,
        }
    }

    pub async fn client(&self) -> Client {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = self.coordinator.connect(tx).await;
        Client { session, rx }
    }

    pub async fn send(&self, client: &mut Client, event: ClientEvent) {
        self.coordinator.handle(&mut client.session, event).await;
    }

    /// 接続を作ってボードに参加し、参加時のイベントを読み捨てる
    pub async fn joined_client(&self, board: &str, token: &str) -> Client {
        let mut client = self.client().await;
        self.send(&mut client, join(board, Some(token))).await;
        client.drain();
        client
    }
}

pub fn join(board: &str, token: Option<&str>) -> ClientEvent {
    ClientEvent::JoinBoard(JoinBoardRequest {
        board_id: board_id(board),
        token: token.map(str::to_string),
    })
}

pub fn create_rect(id: &str) -> ClientEvent {
    ClientEvent::CreateShape(CreateShapeRequest {
        id: shape_id(id),
        shape_type: ShapeType::Rect,
        x: 0.0,
        y: 0.0,
        width: 10.0,
        height: 10.0,
        color: "#000000".to_string(),
        stroke_width: 1.0,
        text: None,
        layer: None,
        points: None,
    })
}
