//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::BoardId,
    infrastructure::dto::http::{BoardSummaryDto, HealthDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Summary of a resident board (for debugging)
pub async fn get_board_summary(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> Result<Json<BoardSummaryDto>, StatusCode> {
    let board_id = BoardId::new(board_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    let snapshot = state
        .get_board_summary_usecase
        .execute(&board_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    // Domain Model から DTO への変換
    Ok(Json(BoardSummaryDto::new(
        &snapshot.board,
        snapshot.locks,
        snapshot.participants,
    )))
}
