//! Authenticator trait 定義

use async_trait::async_trait;

use super::{
    error::AuthError,
    value_object::{ConnectionId, UserId},
};

/// 未認証の接続に付ける表示名
pub const GUEST_DISPLAY_NAME: &str = "Guest";

/// 接続の利用者（検証済みまたはゲスト）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    pub is_guest: bool,
}

impl Identity {
    pub fn authenticated(user_id: UserId, display_name: String, email: Option<String>) -> Self {
        Self {
            user_id,
            display_name,
            email,
            is_guest: false,
        }
    }

    /// 接続 ID から導出したゲストの利用者
    pub fn guest(connection_id: &ConnectionId) -> Self {
        Self {
            user_id: UserId::guest(connection_id),
            display_name: GUEST_DISPLAY_NAME.to_string(),
            email: None,
            is_guest: true,
        }
    }
}

/// トークンの検証
///
/// UseCase 層はこの trait に依存し、具体的な実装は Infrastructure 層が提供します。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
