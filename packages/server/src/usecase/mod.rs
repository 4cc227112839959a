//! UseCase 層
//!
//! Session Coordinator がクライアントのリクエストを受け取り、
//! リクエストの種類ごとのユースケースに振り分けます。
//! ユースケースは Board Hub（ボード単位の排他区間）と
//! Room Router（配信）を通じてドメインを操作します。

pub mod board_hub;
pub mod error;
pub mod get_board_summary;
pub mod join_board;
pub mod leave_board;
pub mod lock_object;
pub mod mutate_shape;
pub mod participant;
pub mod relay;
pub mod room_router;
pub mod session;
pub mod undo;

#[cfg(test)]
pub(crate) mod test_support;

pub use board_hub::{BoardHub, BoardWorkspace, SharedWorkspace};
pub use error::SessionError;
pub use get_board_summary::{BoardSnapshot, GetBoardSummaryUseCase};
pub use join_board::JoinBoardUseCase;
pub use leave_board::LeaveBoardUseCase;
pub use lock_object::{LockObjectUseCase, spawn_lock_sweeper};
pub use mutate_shape::MutateShapeUseCase;
pub use participant::Participant;
pub use relay::RelayUseCase;
pub use room_router::RoomRouter;
pub use session::{Session, SessionCoordinator, SessionState};
pub use undo::UndoUseCase;
