//! 認証（トークン検証）の実装

pub mod jwt;

pub use jwt::{Claims, JwtAuthenticator, issue_token};
