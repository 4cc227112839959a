//! Domain 層のエラー定義

use thiserror::Error;

/// 値オブジェクト生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be at most {1} characters")]
    TooLong(&'static str, usize),
}

/// ボード状態遷移のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("shape '{0}' not found")]
    ShapeNotFound(String),

    #[error("shape '{0}' already exists")]
    DuplicateShape(String),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("cannot undo: {0}")]
    Irreversible(String),

    #[error("field '{0}' cannot be changed")]
    ImmutableField(String),

    #[error("invalid change: {0}")]
    InvalidChange(String),
}

/// Repository（ボードの保存先）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("board '{0}' not found")]
    BoardNotFound(String),

    #[error("storage I/O failed: {0}")]
    Io(String),

    #[error("board document is malformed: {0}")]
    Serialization(String),
}

/// 接続へのメッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// 認証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credential token: {0}")]
    InvalidToken(String),
}
