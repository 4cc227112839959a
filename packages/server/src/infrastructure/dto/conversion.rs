//! Conversion logic between DTOs and domain entities.

use shoji_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    Board, DEFAULT_LAYER, Geometry, Lock, Op, OpPayload, PresenceEntry, Shape, ShapeType,
    Timestamp, UserId,
};
use crate::infrastructure::dto::{
    http::BoardSummaryDto,
    websocket::{CreateShapeRequest, DrawEndRequest, ServerEvent},
};

// ========================================
// DTO → Domain Entity
// ========================================

impl CreateShapeRequest {
    /// Build the shape this request describes, stamped with its creator.
    pub fn into_shape(self, created_by: UserId, created_at: Timestamp) -> Shape {
        let geometry = match self.shape_type {
            ShapeType::Path => Geometry::Path {
                points: self.points.unwrap_or_default(),
            },
            ShapeType::Rect => Geometry::Rect {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            },
            ShapeType::Circle => Geometry::Circle {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            },
            ShapeType::Text => Geometry::Text {
                x: self.x,
                y: self.y,
                text: self.text.unwrap_or_default(),
            },
        };
        Shape {
            id: self.id,
            geometry,
            color: self.color,
            stroke_width: self.stroke_width,
            layer: self.layer.unwrap_or_else(|| DEFAULT_LAYER.to_string()),
            created_by,
            created_at,
        }
    }
}

impl DrawEndRequest {
    /// The finished freehand stroke as a `path` shape.
    pub fn to_shape(&self, created_by: UserId, created_at: Timestamp) -> Shape {
        Shape {
            id: self.id.clone(),
            geometry: Geometry::Path {
                points: self.points.clone(),
            },
            color: self.color.clone(),
            stroke_width: self.stroke_width,
            layer: self
                .layer
                .clone()
                .unwrap_or_else(|| DEFAULT_LAYER.to_string()),
            created_by,
            created_at,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl ServerEvent {
    /// Room notification describing the effect of `op`.
    pub fn from_op(op: &Op) -> Self {
        match &op.payload {
            OpPayload::Create(shape) => ServerEvent::ShapeCreated(shape.clone()),
            OpPayload::Update {
                shape_id, changes, ..
            } => ServerEvent::ShapeUpdated {
                shape_id: shape_id.clone(),
                changes: changes.clone(),
            },
            OpPayload::Delete { shape_id, .. } => ServerEvent::ShapeDeleted {
                shape_id: shape_id.clone(),
            },
        }
    }

    pub fn locked(lock: &Lock) -> Self {
        ServerEvent::LockUpdate {
            object_id: lock.object_id.clone(),
            locked: true,
            user_id: Some(lock.holder.user_id.clone()),
        }
    }

    pub fn unlocked(lock: &Lock) -> Self {
        ServerEvent::LockUpdate {
            object_id: lock.object_id.clone(),
            locked: false,
            user_id: None,
        }
    }
}

impl BoardSummaryDto {
    pub fn new(board: &Board, active_locks: Vec<Lock>, participants: Vec<PresenceEntry>) -> Self {
        Self {
            id: board.id.to_string(),
            owner_id: board.owner_id.to_string(),
            shape_count: board.shapes().len(),
            op_count: board.ops().len(),
            last_op_at: board
                .last_op()
                .and_then(|op| timestamp_to_rfc3339(op.timestamp.value())),
            active_locks,
            participants,
        }
    }
}
