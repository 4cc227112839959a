//! Domain 層
//!
//! 値オブジェクト、エンティティ、ドメインサービス（Lock Table,
//! Presence Registry）と、UseCase 層が依存する外部協調者の trait を定義します。

pub mod authenticator;
pub mod entity;
pub mod error;
pub mod lock_table;
pub mod message_pusher;
pub mod presence_registry;
pub mod repository;
pub mod value_object;

pub use authenticator::{Authenticator, GUEST_DISPLAY_NAME, Identity};
pub use entity::{
    Board, Cursor, DEFAULT_LAYER, Geometry, Lock, LockHolder, Op, OpPayload, OpType, Point,
    PresenceEntry, Shape, ShapeChanges, ShapeType,
};
pub use error::{AuthError, BoardError, MessagePushError, RepositoryError, ValueObjectError};
pub use lock_table::{AcquireOutcome, DEFAULT_LOCK_TIMEOUT_MILLIS, LockTable, ReleaseOutcome};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use presence_registry::{Joined, PALETTE, PresenceRegistry};
pub use repository::BoardRepository;
pub use value_object::{BoardId, ConnectionId, ShapeId, Timestamp, UserId};

#[cfg(test)]
pub use authenticator::MockAuthenticator;
#[cfg(test)]
pub use repository::MockBoardRepository;
