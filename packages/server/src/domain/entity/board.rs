//! Board 集約: 権威ある図形集合と追記専用の op ログ
//!
//! 変更は必ず [`Board::apply_create`], [`Board::apply_update`],
//! [`Board::apply_delete`], [`Board::undo_last`] のいずれかを通り、
//! 図形集合を変えると同時にその変更を表す [`Op`] をちょうど 1 つ追記します。
//! undo もログを書き換えず、補償 op を追記します。

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::BoardError,
    value_object::{BoardId, ShapeId, Timestamp, UserId},
};

use super::{
    op::{Op, OpPayload},
    shape::{Shape, ShapeChanges},
};

/// 1 つの共有ドキュメント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    /// 所有者（常に参加できる）
    pub owner_id: UserId,
    /// 参加を許可された利用者
    #[serde(default)]
    pub allowed_users: Vec<UserId>,
    /// 現在の図形集合（作成順）
    #[serde(default)]
    shapes: Vec<Shape>,
    /// 履歴（古い順）
    #[serde(default)]
    ops: Vec<Op>,
}

impl Board {
    pub fn new(id: BoardId, owner_id: UserId) -> Self {
        Self {
            id,
            owner_id,
            allowed_users: Vec::new(),
            shapes: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn with_allowed_users(mut self, users: Vec<UserId>) -> Self {
        self.allowed_users = users;
        self
    }

    /// `user_id` が所有者または許可ユーザーか
    pub fn can_access(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id || self.allowed_users.contains(user_id)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn shape(&self, shape_id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| &s.id == shape_id)
    }

    pub fn last_op(&self) -> Option<&Op> {
        self.ops.last()
    }

    /// いま undo した場合に変更される図形
    pub fn undo_target(&self) -> Option<&ShapeId> {
        self.last_op().map(|op| op.payload.shape_id())
    }

    /// 図形を追加する
    ///
    /// 既存の ID は拒否し、図形集合もログも変えません。
    pub fn apply_create(
        &mut self,
        shape: Shape,
        actor: UserId,
        now: Timestamp,
    ) -> Result<Op, BoardError> {
        if self.shape(&shape.id).is_some() {
            return Err(BoardError::DuplicateShape(shape.id.into_string()));
        }
        self.shapes.push(shape.clone());
        Ok(self.append(OpPayload::Create(shape), actor, now))
    }

    /// 既存の図形をフィールド単位で更新する
    pub fn apply_update(
        &mut self,
        shape_id: &ShapeId,
        changes: ShapeChanges,
        actor: UserId,
        now: Timestamp,
    ) -> Result<Op, BoardError> {
        let shape = self
            .shape_mut(shape_id)
            .ok_or_else(|| BoardError::ShapeNotFound(shape_id.to_string()))?;
        let old_values = shape.apply_changes(&changes)?;
        Ok(self.append(
            OpPayload::Update {
                shape_id: shape_id.clone(),
                changes,
                old_values,
            },
            actor,
            now,
        ))
    }

    /// 図形を削除し、削除時点のスナップショットを記録する
    pub fn apply_delete(
        &mut self,
        shape_id: &ShapeId,
        actor: UserId,
        now: Timestamp,
    ) -> Result<Op, BoardError> {
        let deleted_shape = self
            .remove(shape_id)
            .ok_or_else(|| BoardError::ShapeNotFound(shape_id.to_string()))?;
        Ok(self.append(
            OpPayload::Delete {
                shape_id: shape_id.clone(),
                deleted_shape,
            },
            actor,
            now,
        ))
    }

    /// 最新の op を誰の操作かに関係なく取り消す
    ///
    /// 補償 op は通常の op と同じように適用・追記されるため、
    /// 続けて undo すると直前の undo が取り消されます。
    pub fn undo_last(&mut self, actor: UserId, now: Timestamp) -> Result<Op, BoardError> {
        let last = self.ops.last().cloned().ok_or(BoardError::NothingToUndo)?;

        let payload = match last.payload {
            OpPayload::Create(created) => {
                let current = self.remove(&created.id).ok_or_else(|| {
                    BoardError::Irreversible(format!("shape '{}' no longer exists", created.id))
                })?;
                OpPayload::Delete {
                    shape_id: created.id,
                    deleted_shape: current,
                }
            }
            OpPayload::Delete {
                shape_id,
                deleted_shape,
            } => {
                if self.shape(&shape_id).is_some() {
                    return Err(BoardError::Irreversible(format!(
                        "shape '{shape_id}' has been re-created"
                    )));
                }
                self.shapes.push(deleted_shape.clone());
                OpPayload::Create(deleted_shape)
            }
            OpPayload::Update {
                shape_id,
                old_values,
                ..
            } => {
                let shape = self.shape_mut(&shape_id).ok_or_else(|| {
                    BoardError::Irreversible(format!("shape '{shape_id}' no longer exists"))
                })?;
                let replaced = shape.apply_changes(&old_values)?;
                OpPayload::Update {
                    shape_id,
                    changes: old_values,
                    old_values: replaced,
                }
            }
        };

        Ok(self.append(payload, actor, now))
    }

    /// 空のボードに `ops` を順に適用して図形集合を再構築する
    pub fn replay(ops: &[Op]) -> Result<Vec<Shape>, BoardError> {
        let mut shapes: Vec<Shape> = Vec::new();
        for op in ops {
            match &op.payload {
                OpPayload::Create(shape) => {
                    if shapes.iter().any(|s| s.id == shape.id) {
                        return Err(BoardError::DuplicateShape(shape.id.to_string()));
                    }
                    shapes.push(shape.clone());
                }
                OpPayload::Update {
                    shape_id, changes, ..
                } => {
                    let shape = shapes
                        .iter_mut()
                        .find(|s| &s.id == shape_id)
                        .ok_or_else(|| BoardError::ShapeNotFound(shape_id.to_string()))?;
                    shape.apply_changes(changes)?;
                }
                OpPayload::Delete { shape_id, .. } => {
                    let index = shapes
                        .iter()
                        .position(|s| &s.id == shape_id)
                        .ok_or_else(|| BoardError::ShapeNotFound(shape_id.to_string()))?;
                    shapes.remove(index);
                }
            }
        }
        Ok(shapes)
    }

    fn shape_mut(&mut self, shape_id: &ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| &s.id == shape_id)
    }

    fn remove(&mut self, shape_id: &ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| &s.id == shape_id)?;
        Some(self.shapes.remove(index))
    }

    fn append(&mut self, payload: OpPayload, actor: UserId, now: Timestamp) -> Op {
        let op = Op {
            seq: self.ops.len() as u64 + 1,
            payload,
            actor,
            timestamp: now,
        };
        self.ops.push(op.clone());
        op
    }
}
