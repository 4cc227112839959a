//! Shared application state.

use std::sync::Arc;

use crate::usecase::{GetBoardSummaryUseCase, SessionCoordinator};

pub struct AppState {
    /// SessionCoordinator（WebSocket 接続ごとのリクエスト処理）
    pub session_coordinator: Arc<SessionCoordinator>,
    /// GetBoardSummaryUseCase（ボード状態取得のユースケース）
    pub get_board_summary_usecase: Arc<GetBoardSummaryUseCase>,
}
