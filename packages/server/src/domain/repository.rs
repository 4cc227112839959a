//! Repository trait 定義
//!
//! ドメイン層が必要とするボード永続化のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{BoardId, RepositoryError, entity::Board};

/// Board Repository trait
///
/// ボード ID をキーとする get/put 型のドキュメントストア。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// ボードを読み込む（存在しない場合は `RepositoryError::BoardNotFound`）
    async fn load_board(&self, board_id: &BoardId) -> Result<Board, RepositoryError>;

    /// ボード全体（図形集合と op ログ）を保存する
    async fn save_board(&self, board: &Board) -> Result<(), RepositoryError>;
}
