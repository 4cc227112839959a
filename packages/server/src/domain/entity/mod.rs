//! エンティティ定義

pub mod board;
pub mod lock;
pub mod op;
pub mod presence;
pub mod shape;

pub use board::Board;
pub use lock::{Lock, LockHolder};
pub use op::{Op, OpPayload, OpType};
pub use presence::{Cursor, PresenceEntry};
pub use shape::{DEFAULT_LAYER, Geometry, Point, Shape, ShapeChanges, ShapeType};
