//! UseCase: 直前の操作の取り消し
//!
//! 取り消しはボード全体で共通（誰の操作でも最新の op が対象）です。
//! 対象の図形を他の接続がロックしている場合は Conflict になります。
//! 適用後は補償 op と図形集合全体を undo-applied として全員に送ります。
//! 補償 op が削除なら、取り消した接続がその図形に持つロックも解放します。

use std::sync::Arc;

use crate::{
    domain::{OpPayload, ReleaseOutcome},
    infrastructure::dto::websocket::ServerEvent,
};

use super::{
    board_hub::BoardHub, error::SessionError, lock_object::expire_locks,
    mutate_shape::ensure_writable, participant::Participant, room_router::RoomRouter,
};

pub struct UndoUseCase {
    hub: Arc<BoardHub>,
    router: Arc<RoomRouter>,
}

impl UndoUseCase {
    pub fn new(hub: Arc<BoardHub>, router: Arc<RoomRouter>) -> Self {
        Self { hub, router }
    }

    pub async fn execute(&self, participant: &Participant) -> Result<(), SessionError> {
        let workspace = self.hub.open(&participant.board_id).await?;
        let mut ws = workspace.lock().await;
        let now = self.hub.now();
        expire_locks(&self.router, &participant.board_id, &mut ws, now).await;

        if let Some(target) = ws.board.undo_target().cloned() {
            ensure_writable(&mut ws, &target, &participant.connection_id, now)?;
        }
        let undo_op = ws.board.undo_last(participant.user_id().clone(), now)?;

        let removed = match &undo_op.payload {
            OpPayload::Delete { shape_id, .. } => Some(shape_id.clone()),
            _ => None,
        };
        let event = ServerEvent::UndoApplied {
            undo_op,
            shapes: ws.board.shapes().to_vec(),
        };
        self.router
            .broadcast_to_all(&participant.board_id, &event)
            .await;
        if let Some(shape_id) = removed
            && let ReleaseOutcome::Released(lock) =
                ws.locks
                    .release(&shape_id, &participant.connection_id, now)
        {
            self.router
                .broadcast_to_all(&participant.board_id, &ServerEvent::unlocked(&lock))
                .await;
        }

        self.hub
            .persist(&ws.board)
            .await
            .map_err(|e| SessionError::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        domain::{Board, Geometry, OpPayload, ShapeChanges},
        infrastructure::dto::websocket::{
            ClientEvent, DeleteShapeRequest, ObjectRequest, ServerEvent, UpdateShapeRequest,
        },
        usecase::test_support::{Harness, board_id, create_rect, shape_id},
    };

    fn update_x(id: &str, x: f64) -> ClientEvent {
        let mut changes = ShapeChanges::new();
        changes.insert("x".to_string(), json!(x));
        ClientEvent::UpdateShape(UpdateShapeRequest {
            shape_id: shape_id(id),
            changes,
        })
    }

    #[tokio::test]
    async fn test_update_then_undo_restores_position() {
        // テスト項目: x:0 → 50 の更新を取り消すと x:0 に戻り、全員に undo-applied が届く
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.joined_client("b1", "alice").await;
        let mut bob = harness.joined_client("b1", "bob").await;
        harness.send(&mut alice, create_rect("s1")).await;
        harness.send(&mut alice, update_x("s1", 50.0)).await;
        alice.drain();
        bob.drain();

        // when (操作):
        harness.send(&mut bob, ClientEvent::Undo).await;

        // then (期待する結果):
        let events = alice.drain();
        assert_eq!(events, bob.drain());
        match events.as_slice() {
            [ServerEvent::UndoApplied { undo_op, shapes }] => {
                assert_eq!(undo_op.seq, 3);
                assert_eq!(undo_op.actor.as_str(), "bob");
                assert!(matches!(
                    &undo_op.payload,
                    OpPayload::Update { changes, .. } if changes.get("x") == Some(&json!(0.0))
                ));
                assert_eq!(shapes.len(), 1);
                assert_eq!(
                    shapes[0].geometry,
                    Geometry::Rect {
                        x: 0.0,
                        y: 0.0,
                        width: 10.0,
                        height: 10.0
                    }
                );
            }
            other => panic!("expected undo-applied, got {other:?}"),
        }

        let workspace = harness.hub.resident(&board_id("b1")).await.unwrap();
        let ws = workspace.lock().await;
        assert_eq!(Board::replay(ws.board.ops()).unwrap(), ws.board.shapes());
    }

    #[tokio::test]
    async fn test_undo_delete_restores_shape() {
        // テスト項目: 削除の取り消しで図形が同じ値で復元される
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.joined_client("b1", "alice").await;
        harness.send(&mut alice, create_rect("s1")).await;
        let workspace = harness.hub.resident(&board_id("b1")).await.unwrap();
        let before = workspace.lock().await.board.shapes().to_vec();
        harness
            .send(
                &mut alice,
                ClientEvent::DeleteShape(DeleteShapeRequest {
                    shape_id: shape_id("s1"),
                }),
            )
            .await;
        alice.drain();

        // when (操作):
        harness.send(&mut alice, ClientEvent::Undo).await;

        // then (期待する結果):
        assert!(matches!(
            alice.drain().as_slice(),
            [ServerEvent::UndoApplied { shapes, .. }] if shapes == &before
        ));
    }

    #[tokio::test]
    async fn test_undo_on_empty_log() {
        // テスト項目: op が無いボードでの取り消しは要求元にだけエラーが届く
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.joined_client("b1", "alice").await;
        let mut bob = harness.joined_client("b1", "bob").await;
        alice.drain();

        // when (操作):
        harness.send(&mut alice, ClientEvent::Undo).await;

        // then (期待する結果):
        assert_eq!(alice.drain(), vec![ServerEvent::error("Nothing to undo")]);
        assert!(bob.drain().is_empty());
    }

    #[tokio::test]
    async fn test_undo_of_locked_shape_is_conflict() {
        // テスト項目: 取り消し対象の図形を他の接続がロック中なら Conflict
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.joined_client("b1", "alice").await;
        let mut bob = harness.joined_client("b1", "bob").await;
        harness.send(&mut alice, create_rect("s1")).await;
        harness
            .send(
                &mut alice,
                ClientEvent::LockObject(ObjectRequest {
                    object_id: shape_id("s1"),
                }),
            )
            .await;
        bob.drain();

        // when (操作):
        harness.send(&mut bob, ClientEvent::Undo).await;

        // then (期待する結果):
        assert_eq!(
            bob.drain(),
            vec![ServerEvent::error("Object 's1' is locked by 'alice'")]
        );
        let workspace = harness.hub.resident(&board_id("b1")).await.unwrap();
        assert_eq!(workspace.lock().await.board.shapes().len(), 1);
    }

    #[tokio::test]
    async fn test_undo_create_releases_undoers_lock() {
        // テスト項目: 作成の取り消しで図形が消えると、取り消した接続のロックも解放される
        // given (前提条件):
        let harness = Harness::new();
        let mut alice = harness.joined_client("b1", "alice").await;
        let mut bob = harness.joined_client("b1", "bob").await;
        harness.send(&mut alice, create_rect("s1")).await;
        harness
            .send(
                &mut alice,
                ClientEvent::LockObject(ObjectRequest {
                    object_id: shape_id("s1"),
                }),
            )
            .await;
        bob.drain();

        // when (操作):
        harness.send(&mut alice, ClientEvent::Undo).await;

        // then (期待する結果):
        assert!(matches!(
            bob.drain().as_slice(),
            [
                ServerEvent::UndoApplied { shapes, .. },
                ServerEvent::LockUpdate { object_id, locked: false, .. },
            ] if shapes.is_empty() && object_id == &shape_id("s1")
        ));
        let workspace = harness.hub.resident(&board_id("b1")).await.unwrap();
        let now = harness.hub.now();
        assert!(workspace.lock().await.locks.active(now).is_empty());
    }
}
