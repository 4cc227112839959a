//! UseCase 層のエラー定義
//!
//! `SessionError` は 1 つのリクエストに閉じた失敗を表します。
//! どのエラーも接続やプロセスを終了させません。

use thiserror::Error;

use crate::domain::{AuthError, BoardError, RepositoryError, ShapeId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Access denied to board '{0}'")]
    AccessDenied(String),

    #[error("Board '{0}' not found")]
    BoardNotFound(String),

    #[error("Shape '{0}' not found")]
    ShapeNotFound(String),

    #[error("Object '{object_id}' is locked by '{locked_by}'")]
    Conflict { object_id: ShapeId, locked_by: UserId },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Cannot undo: {0}")]
    Irreversible(String),

    #[error("Shape '{0}' already exists")]
    DuplicateShape(String),

    #[error("Invalid change: {0}")]
    InvalidChange(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// リクエストを受けた時点でボードに参加していない（クライアントには通知しない）
    #[error("Connection is not joined to a board")]
    NotJoined,
}

impl From<BoardError> for SessionError {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::ShapeNotFound(id) => SessionError::ShapeNotFound(id),
            BoardError::DuplicateShape(id) => SessionError::DuplicateShape(id),
            BoardError::NothingToUndo => SessionError::NothingToUndo,
            BoardError::Irreversible(reason) => SessionError::Irreversible(reason),
            BoardError::ImmutableField(field) => {
                SessionError::InvalidChange(format!("field '{field}' cannot be changed"))
            }
            BoardError::InvalidChange(reason) => SessionError::InvalidChange(reason),
        }
    }
}

impl From<RepositoryError> for SessionError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::BoardNotFound(id) => SessionError::BoardNotFound(id),
            other => SessionError::Persistence(other.to_string()),
        }
    }
}

impl SessionError {
    pub fn access_denied(board_id: impl ToString) -> Self {
        SessionError::AccessDenied(board_id.to_string())
    }

    /// 認証失敗は参加拒否として扱う
    pub fn from_auth(board_id: impl ToString, e: AuthError) -> Self {
        tracing::debug!("Token rejected: {}", e);
        SessionError::access_denied(board_id)
    }
}
