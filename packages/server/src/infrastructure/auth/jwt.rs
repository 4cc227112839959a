//! JWT（HS256）を使った Authenticator 実装
//!
//! `join-board` のトークンは [`Claims`] を持ちます。`sub` を利用者 ID、
//! `name` を参加者一覧の表示名として使います。

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, Authenticator, Identity, UserId};

/// サーバーが受け付ける JWT クレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 利用者 ID
    pub sub: String,
    /// 表示名
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 有効期限（UTC の Unix タイムスタンプ）
    pub exp: i64,
}

/// 共有 HMAC シークレットで検証する [`Authenticator`]
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(), // HS256, validates exp
        }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        let user_id =
            UserId::new(claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(Identity::authenticated(user_id, claims.name, claims.email))
    }
}

/// `claims` を `secret` で署名する
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
