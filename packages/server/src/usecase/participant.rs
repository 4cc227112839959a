//! 参加中の接続を表す値

use crate::domain::{BoardId, ConnectionId, Identity, LockHolder, UserId};

/// ボードに参加中の 1 接続
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub board_id: BoardId,
    pub identity: Identity,
}

impl Participant {
    pub fn user_id(&self) -> &UserId {
        &self.identity.user_id
    }

    pub fn lock_holder(&self) -> LockHolder {
        LockHolder::new(self.connection_id, self.identity.user_id.clone())
    }
}
