//! Lock エンティティ: 1 つのオブジェクトに対する期限付きの排他ロック

use serde::{Deserialize, Serialize};

use crate::domain::value_object::{ConnectionId, ShapeId, Timestamp, UserId};

/// ロックの保持者
///
/// 保持の判定は接続単位です。利用者 ID は、誰が編集中かを
/// 他のクライアントに伝えるために持ちます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockHolder {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
}

impl LockHolder {
    pub fn new(connection_id: ConnectionId, user_id: UserId) -> Self {
        Self {
            connection_id,
            user_id,
        }
    }

    pub fn is_connection(&self, connection_id: &ConnectionId) -> bool {
        &self.connection_id == connection_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lock {
    pub object_id: ShapeId,
    #[serde(flatten)]
    pub holder: LockHolder,
    pub acquired_at: Timestamp,
}

impl Lock {
    /// `now` の時点で `timeout_millis` を過ぎているか
    pub fn is_stale(&self, now: Timestamp, timeout_millis: i64) -> bool {
        self.acquired_at.elapsed_until(now) >= timeout_millis
    }
}
