//! InMemory Board Repository 実装
//!
//! ドメイン層が定義する BoardRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用し、ボード ID ごとに
//! ドキュメント（Board ドメインモデル）を丸ごと保持します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Board, BoardId, BoardRepository, RepositoryError};

/// インメモリ Board Repository 実装
#[derive(Default)]
pub struct InMemoryBoardRepository {
    boards: Arc<Mutex<HashMap<BoardId, Board>>>,
}

impl InMemoryBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期ボードを登録した状態で作成
    pub fn with_boards(boards: impl IntoIterator<Item = Board>) -> Self {
        let boards = boards
            .into_iter()
            .map(|board| (board.id.clone(), board))
            .collect();
        Self {
            boards: Arc::new(Mutex::new(boards)),
        }
    }
}

#[async_trait]
impl BoardRepository for InMemoryBoardRepository {
    async fn load_board(&self, board_id: &BoardId) -> Result<Board, RepositoryError> {
        let boards = self.boards.lock().await;
        boards
            .get(board_id)
            .cloned()
            .ok_or_else(|| RepositoryError::BoardNotFound(board_id.to_string()))
    }

    async fn save_board(&self, board: &Board) -> Result<(), RepositoryError> {
        let mut boards = self.boards.lock().await;
        boards.insert(board.id.clone(), board.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Geometry, Shape, ShapeId, Timestamp, UserId};

    fn board_id(s: &str) -> BoardId {
        BoardId::new(s.to_string()).unwrap()
    }

    fn alice() -> UserId {
        UserId::new("alice".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_load_seeded_board() {
        // テスト項目: 初期登録したボードを読み込める
        // given (前提条件):
        let repo = InMemoryBoardRepository::with_boards([Board::new(board_id("b1"), alice())]);

        // when (操作):
        let board = repo.load_board(&board_id("b1")).await;

        // then (期待する結果):
        assert_eq!(board.unwrap().owner_id, alice());
    }

    #[tokio::test]
    async fn test_load_missing_board() {
        // テスト項目: 存在しないボードは BoardNotFound になる
        // given (前提条件):
        let repo = InMemoryBoardRepository::new();

        // when (操作):
        let result = repo.load_board(&board_id("missing")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::BoardNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_save_overwrites_document() {
        // テスト項目: 保存したボードが次の読み込みに反映される
        // given (前提条件):
        let repo = InMemoryBoardRepository::with_boards([Board::new(board_id("b1"), alice())]);
        let mut board = repo.load_board(&board_id("b1")).await.unwrap();
        let shape = Shape {
            id: ShapeId::new("s1".to_string()).unwrap(),
            geometry: Geometry::Rect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            },
            color: "#000000".to_string(),
            stroke_width: 1.0,
            layer: "default".to_string(),
            created_by: alice(),
            created_at: Timestamp::new(1),
        };
        board.apply_create(shape, alice(), Timestamp::new(1)).unwrap();

        // when (操作):
        repo.save_board(&board).await.unwrap();

        // then (期待する結果):
        let reloaded = repo.load_board(&board_id("b1")).await.unwrap();
        assert_eq!(reloaded.shapes().len(), 1);
        assert_eq!(reloaded.ops().len(), 1);
    }
}
