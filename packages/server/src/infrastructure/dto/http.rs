//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{Lock, PresenceEntry};

/// Debug summary of a resident board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummaryDto {
    pub id: String,
    pub owner_id: String,
    pub shape_count: usize,
    pub op_count: usize,
    /// RFC 3339 time of the newest op
    pub last_op_at: Option<String>,
    pub active_locks: Vec<Lock>,
    pub participants: Vec<PresenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}
