//! PresenceEntry: 参加中の利用者とそのカーソル

use serde::{Deserialize, Serialize};

use crate::domain::value_object::{ConnectionId, UserId};

/// ボード座標でのカーソル位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub display_name: String,
    /// カーソル色（[`crate::domain::presence_registry::PALETTE`] のいずれか）
    pub color: String,
    pub cursor: Cursor,
}
