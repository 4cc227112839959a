//! Infrastructure 層
//!
//! 送受信の DTO と、Domain 層の trait（Repository, MessagePusher,
//! Authenticator）の具体的な実装を提供します。

pub mod auth;
pub mod dto;
pub mod message_pusher;
pub mod repository;
