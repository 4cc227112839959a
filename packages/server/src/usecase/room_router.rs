//! Room Router: ボードごとの接続メンバーシップとイベントの配信
//!
//! メンバーシップは Presence Registry が保持する参加エントリそのものです。
//! join/leave は Presence Registry を更新し、配信先は常にその時点の
//! ボードの参加者に限られます（他ボードへの漏洩なし）。
//!
//! ## 配信順序
//!
//! 各宛先へのフレームは MessagePusher のチャンネルへ送信順に積まれます。
//! 同じボードの変更系イベントは Board Hub のボード単位の排他区間の中で
//! 送信されるため、全メンバーが同じ順序で受信します。

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    domain::{
        BoardId, ConnectionId, Identity, Joined, MessagePusher, PresenceEntry, PresenceRegistry,
        PusherChannel,
    },
    infrastructure::dto::websocket::ServerEvent,
};

pub struct RoomRouter {
    presence: Mutex<PresenceRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RoomRouter {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence: Mutex::new(PresenceRegistry::new()),
            message_pusher,
        }
    }

    /// 接続の送信チャンネルを登録
    pub async fn connect(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
    }

    /// 接続の送信チャンネルを登録解除
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        self.message_pusher.unregister_client(connection_id).await;
    }

    /// ルームに参加（別のボードに参加中ならそちらからは外れる）
    pub async fn join(
        &self,
        board_id: &BoardId,
        connection_id: ConnectionId,
        identity: &Identity,
    ) -> Joined {
        let mut presence = self.presence.lock().await;
        presence.join(board_id, connection_id, identity)
    }

    /// ルームから退出
    pub async fn leave(
        &self,
        board_id: &BoardId,
        connection_id: &ConnectionId,
    ) -> Option<PresenceEntry> {
        let mut presence = self.presence.lock().await;
        presence.leave(board_id, connection_id)
    }

    pub async fn update_cursor(
        &self,
        board_id: &BoardId,
        connection_id: &ConnectionId,
        x: f64,
        y: f64,
    ) -> Option<PresenceEntry> {
        let mut presence = self.presence.lock().await;
        presence.update_cursor(board_id, connection_id, x, y)
    }

    /// ボードの参加者一覧
    pub async fn presence_snapshot(&self, board_id: &BoardId) -> Vec<PresenceEntry> {
        let presence = self.presence.lock().await;
        presence.snapshot(board_id)
    }

    /// ボードに参加中の接続
    pub async fn members(&self, board_id: &BoardId) -> Vec<ConnectionId> {
        self.presence_snapshot(board_id)
            .await
            .into_iter()
            .map(|entry| entry.connection_id)
            .collect()
    }

    /// 1 接続に送信
    pub async fn send_to(&self, connection_id: &ConnectionId, event: &ServerEvent) {
        let Some(frame) = encode(event) else {
            return;
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &frame).await {
            tracing::warn!("Failed to push frame to '{}': {}", connection_id, e);
        }
    }

    /// ボードの全参加者に送信
    pub async fn broadcast_to_all(&self, board_id: &BoardId, event: &ServerEvent) {
        let targets = self.members(board_id).await;
        self.fan_out(&targets, event).await;
    }

    /// 送信元を除くボードの参加者に送信
    pub async fn broadcast_to_others(
        &self,
        board_id: &BoardId,
        sender: &ConnectionId,
        event: &ServerEvent,
    ) {
        let targets: Vec<ConnectionId> = self
            .members(board_id)
            .await
            .into_iter()
            .filter(|id| id != sender)
            .collect();
        self.fan_out(&targets, event).await;
    }

    async fn fan_out(&self, targets: &[ConnectionId], event: &ServerEvent) {
        if targets.is_empty() {
            return;
        }
        let Some(frame) = encode(event) else {
            return;
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &frame).await {
            tracing::warn!("Failed to broadcast frame: {}", e);
        }
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match event.to_frame() {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!("Failed to encode outbound event: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use tokio::sync::mpsc;

    fn board(s: &str) -> BoardId {
        BoardId::new(s.to_string()).unwrap()
    }

    async fn connected(
        router: &RoomRouter,
        board_id: &BoardId,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        router.connect(connection_id, tx).await;
        router
            .join(board_id, connection_id, &Identity::guest(&connection_id))
            .await;
        (connection_id, rx)
    }

    fn router() -> RoomRouter {
        RoomRouter::new(Arc::new(WebSocketMessagePusher::new()))
    }

    #[tokio::test]
    async fn test_broadcast_to_others_skips_sender() {
        // テスト項目: broadcast_to_others は送信元に届かない
        // given (前提条件):
        let router = router();
        let b1 = board("b1");
        let (alice, mut alice_rx) = connected(&router, &b1).await;
        let (_bob, mut bob_rx) = connected(&router, &b1).await;

        // when (操作):
        router
            .broadcast_to_others(&b1, &alice, &ServerEvent::error("hello"))
            .await;

        // then (期待する結果):
        assert!(bob_rx.recv().await.unwrap().contains("hello"));
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_no_cross_board_leakage() {
        // テスト項目: ボード A への配信はボード B の参加者に届かない
        // given (前提条件):
        let router = router();
        let (_alice, mut alice_rx) = connected(&router, &board("a")).await;
        let (_bob, mut bob_rx) = connected(&router, &board("b")).await;

        // when (操作):
        router
            .broadcast_to_all(&board("a"), &ServerEvent::error("only-a"))
            .await;

        // then (期待する結果):
        assert!(alice_rx.recv().await.unwrap().contains("only-a"));
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delivery_order_matches_submission_order() {
        // テスト項目: 同じボードへの配信は送信順に届く
        // given (前提条件):
        let router = router();
        let b1 = board("b1");
        let (_alice, mut alice_rx) = connected(&router, &b1).await;
        let (_bob, mut bob_rx) = connected(&router, &b1).await;

        // when (操作):
        for i in 0..10 {
            router
                .broadcast_to_all(&b1, &ServerEvent::error(format!("m{i}")))
                .await;
        }

        // then (期待する結果):
        for rx in [&mut alice_rx, &mut bob_rx] {
            for i in 0..10 {
                let frame = rx.recv().await.unwrap();
                assert!(frame.contains(&format!("\"m{i}\"")));
            }
        }
    }

    #[tokio::test]
    async fn test_switching_boards_moves_membership() {
        // テスト項目: 別ボードへの参加で元ボードのメンバーから外れる
        // given (前提条件):
        let router = router();
        let (alice, _rx) = connected(&router, &board("a")).await;

        // when (操作):
        let joined = router
            .join(&board("b"), alice, &Identity::guest(&alice))
            .await;

        // then (期待する結果):
        assert_eq!(joined.left.map(|(board_id, _)| board_id), Some(board("a")));
        assert!(router.members(&board("a")).await.is_empty());
        assert_eq!(router.members(&board("b")).await, vec![alice]);
    }
}
