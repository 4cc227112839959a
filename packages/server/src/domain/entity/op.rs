//! Op エンティティ: ボードの追記専用履歴に記録された 1 つの変更

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_object::{ShapeId, Timestamp, UserId};

use super::shape::{Shape, ShapeChanges};

/// op の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpType {
    Create,
    Update,
    Delete,
}

/// op のペイロード（[`OpType`] ごとに 1 つ）
#[derive(Debug, Clone, PartialEq)]
pub enum OpPayload {
    /// 作成した図形そのもの
    Create(Shape),
    /// フィールド単位の更新と、置き換える前の値
    Update {
        shape_id: ShapeId,
        changes: ShapeChanges,
        old_values: ShapeChanges,
    },
    /// 削除（undo 用に削除した図形のスナップショットを持つ）
    Delete {
        shape_id: ShapeId,
        deleted_shape: Shape,
    },
}

impl OpPayload {
    pub fn op_type(&self) -> OpType {
        match self {
            OpPayload::Create(_) => OpType::Create,
            OpPayload::Update { .. } => OpType::Update,
            OpPayload::Delete { .. } => OpType::Delete,
        }
    }

    /// 対象の図形 ID
    pub fn shape_id(&self) -> &ShapeId {
        match self {
            OpPayload::Create(shape) => &shape.id,
            OpPayload::Update { shape_id, .. } | OpPayload::Delete { shape_id, .. } => shape_id,
        }
    }
}

/// 記録された変更
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOp", into = "RawOp")]
pub struct Op {
    /// 履歴内の位置（1 始まり）
    pub seq: u64,
    pub payload: OpPayload,
    pub actor: UserId,
    pub timestamp: Timestamp,
}

impl Op {
    pub fn op_type(&self) -> OpType {
        self.payload.op_type()
    }
}

/// op の送受信形式: `{seq, opType, payload, actor, timestamp}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOp {
    seq: u64,
    op_type: OpType,
    payload: Value,
    actor: UserId,
    timestamp: Timestamp,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdatePayload {
    shape_id: ShapeId,
    changes: ShapeChanges,
    old_values: ShapeChanges,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DeletePayload {
    shape_id: ShapeId,
    deleted_shape: Shape,
}

impl TryFrom<RawOp> for Op {
    type Error = String;

    fn try_from(raw: RawOp) -> Result<Self, Self::Error> {
        let op_type = raw.op_type;
        let mismatch =
            |e: serde_json::Error| format!("payload does not match op type {op_type:?}: {e}");
        let payload = match op_type {
            OpType::Create => {
                OpPayload::Create(serde_json::from_value::<Shape>(raw.payload).map_err(mismatch)?)
            }
            OpType::Update => {
                let p =
                    serde_json::from_value::<UpdatePayload>(raw.payload).map_err(mismatch)?;
                OpPayload::Update {
                    shape_id: p.shape_id,
                    changes: p.changes,
                    old_values: p.old_values,
                }
            }
            OpType::Delete => {
                let p =
                    serde_json::from_value::<DeletePayload>(raw.payload).map_err(mismatch)?;
                OpPayload::Delete {
                    shape_id: p.shape_id,
                    deleted_shape: p.deleted_shape,
                }
            }
        };
        Ok(Op {
            seq: raw.seq,
            payload,
            actor: raw.actor,
            timestamp: raw.timestamp,
        })
    }
}

impl From<Op> for RawOp {
    fn from(op: Op) -> Self {
        let op_type = op.op_type();
        let payload = match op.payload {
            OpPayload::Create(shape) => serde_json::to_value(shape),
            OpPayload::Update {
                shape_id,
                changes,
                old_values,
            } => serde_json::to_value(UpdatePayload {
                shape_id,
                changes,
                old_values,
            }),
            OpPayload::Delete {
                shape_id,
                deleted_shape,
            } => serde_json::to_value(DeletePayload {
                shape_id,
                deleted_shape,
            }),
        };
        RawOp {
            seq: op.seq,
            op_type,
            // 図形と文字列キーの map は必ずエンコードできる
            payload: payload.unwrap_or(Value::Null),
            actor: op.actor,
            timestamp: op.timestamp,
        }
    }
}
