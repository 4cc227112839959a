//! WebSocket event DTOs.
//!
//! Every frame is a JSON object `{"event": "<kebab-case name>", "data": {...}}`.
//! Requests without a payload (`leave-board`, `undo`) omit `data`.

use serde::{Deserialize, Serialize};

use crate::domain::{
    BoardId, ConnectionId, Cursor, Lock, Op, Point, PresenceEntry, Shape, ShapeChanges, ShapeId,
    ShapeType, UserId,
};

// ========================================
// Client → Server
// ========================================

/// Inbound request from a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinBoard(JoinBoardRequest),
    LeaveBoard,
    DrawStart(DrawStartRequest),
    DrawDelta(DrawDeltaRequest),
    DrawEnd(DrawEndRequest),
    CreateShape(CreateShapeRequest),
    UpdateShape(UpdateShapeRequest),
    DeleteShape(DeleteShapeRequest),
    Undo,
    LockObject(ObjectRequest),
    UnlockObject(ObjectRequest),
    CursorMove(CursorMoveRequest),
}

impl ClientEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinBoard(_) => "join-board",
            ClientEvent::LeaveBoard => "leave-board",
            ClientEvent::DrawStart(_) => "draw-start",
            ClientEvent::DrawDelta(_) => "draw-delta",
            ClientEvent::DrawEnd(_) => "draw-end",
            ClientEvent::CreateShape(_) => "create-shape",
            ClientEvent::UpdateShape(_) => "update-shape",
            ClientEvent::DeleteShape(_) => "delete-shape",
            ClientEvent::Undo => "undo",
            ClientEvent::LockObject(_) => "lock-object",
            ClientEvent::UnlockObject(_) => "unlock-object",
            ClientEvent::CursorMove(_) => "cursor-move",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBoardRequest {
    pub board_id: BoardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStartRequest {
    pub id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawDeltaRequest {
    pub id: ShapeId,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawEndRequest {
    pub id: ShapeId,
    pub points: Vec<Point>,
    pub color: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShapeRequest {
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    pub color: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Only meaningful for `path` shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShapeRequest {
    pub shape_id: ShapeId,
    pub changes: ShapeChanges,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteShapeRequest {
    pub shape_id: ShapeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRequest {
    pub object_id: ShapeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorMoveRequest {
    pub x: f64,
    pub y: f64,
}

// ========================================
// Server → Client
// ========================================

/// Outbound event to one or more clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    BoardState {
        board_id: BoardId,
        shapes: Vec<Shape>,
        ops: Vec<Op>,
        locks: Vec<Lock>,
    },
    PresenceState(Vec<PresenceEntry>),
    UserJoined(PresenceEntry),
    UserLeft {
        connection_id: ConnectionId,
        user_id: UserId,
    },
    DrawStart {
        id: ShapeId,
        x: f64,
        y: f64,
        color: String,
        stroke_width: f64,
        user_id: UserId,
    },
    DrawDelta {
        id: ShapeId,
        points: Vec<Point>,
        user_id: UserId,
    },
    DrawEnd {
        id: ShapeId,
        points: Vec<Point>,
        color: String,
        stroke_width: f64,
        layer: String,
        user_id: UserId,
    },
    ShapeCreated(Shape),
    ShapeUpdated {
        shape_id: ShapeId,
        changes: ShapeChanges,
    },
    ShapeDeleted {
        shape_id: ShapeId,
    },
    UndoApplied {
        undo_op: Op,
        shapes: Vec<Shape>,
    },
    LockUpdate {
        object_id: ShapeId,
        locked: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<UserId>,
    },
    LockFailed {
        object_id: ShapeId,
        locked_by: UserId,
    },
    CursorUpdate {
        connection_id: ConnectionId,
        user_id: UserId,
        cursor: Cursor,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    /// Encode as a text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_join_board_with_token() {
        // テスト項目: join-board リクエストを解析できる
        // given (前提条件):
        let frame = r#"{"event":"join-board","data":{"boardId":"b1","token":"t"}}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::JoinBoard(JoinBoardRequest {
                board_id: BoardId::new("b1".to_string()).unwrap(),
                token: Some("t".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_requests_without_payload() {
        // テスト項目: data の無い undo / leave-board を解析できる
        // given (前提条件):
        let undo = r#"{"event":"undo"}"#;
        let leave = r#"{"event":"leave-board","data":null}"#;

        // when (操作):
        let undo: ClientEvent = serde_json::from_str(undo).unwrap();
        let leave: ClientEvent = serde_json::from_str(leave).unwrap();

        // then (期待する結果):
        assert_eq!(undo, ClientEvent::Undo);
        assert_eq!(leave, ClientEvent::LeaveBoard);
    }

    #[test]
    fn test_parse_create_shape_with_type_field() {
        // テスト項目: create-shape の type フィールドが図形種別として解析される
        // given (前提条件):
        let frame = json!({
            "event": "create-shape",
            "data": {"id": "s1", "type": "rect", "x": 0, "y": 0, "width": 10, "height": 10,
                     "color": "#000", "strokeWidth": 2}
        });

        // when (操作):
        let event: ClientEvent = serde_json::from_value(frame).unwrap();

        // then (期待する結果):
        match event {
            ClientEvent::CreateShape(req) => {
                assert_eq!(req.shape_type, ShapeType::Rect);
                assert_eq!(req.width, 10.0);
                assert_eq!(req.layer, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        // テスト項目: 未知のイベント名は解析エラーになる
        // given (前提条件):
        let frame = r#"{"event":"format-disk","data":{}}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(frame);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_lock_update_omits_user_when_unlocked() {
        // テスト項目: 解除の lock-update は userId を含まない
        // given (前提条件):
        let event = ServerEvent::LockUpdate {
            object_id: ShapeId::new("s1".to_string()).unwrap(),
            locked: false,
            user_id: None,
        };

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"event": "lock-update", "data": {"objectId": "s1", "locked": false}})
        );
    }

    #[test]
    fn test_lock_failed_names_holder() {
        // テスト項目: lock-failed は lockedBy を camelCase で含む
        // given (前提条件):
        let event = ServerEvent::LockFailed {
            object_id: ShapeId::new("s1".to_string()).unwrap(),
            locked_by: UserId::new("alice".to_string()).unwrap(),
        };

        // when (操作):
        let frame = event.to_frame().unwrap();

        // then (期待する結果):
        assert_eq!(
            frame,
            r#"{"event":"lock-failed","data":{"objectId":"s1","lockedBy":"alice"}}"#
        );
    }
}
