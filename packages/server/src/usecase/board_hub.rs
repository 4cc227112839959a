//! Board Hub: 常駐ボードとボード単位の排他区間
//!
//! ボードは最初のアクセス時に Repository から読み込まれ、以降はメモリに
//! 常駐します。各ボードは Board と Lock Table をまとめた
//! [`BoardWorkspace`] を 1 つの非同期 Mutex で保護し、
//! 「読む → 判定 → 変更 → op 追加 → 配信 → 保存」を同じボードの他の
//! リクエストに対して不可分に実行します。異なるボードは並行に動きます。

use std::{collections::HashMap, sync::Arc};

use shoji_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{Board, BoardId, BoardRepository, LockTable, RepositoryError, Timestamp};

/// 1 ボード分の権威ある状態
#[derive(Debug)]
pub struct BoardWorkspace {
    pub board: Board,
    pub locks: LockTable,
}

pub type SharedWorkspace = Arc<Mutex<BoardWorkspace>>;

pub struct BoardHub {
    repository: Arc<dyn BoardRepository>,
    clock: Arc<dyn Clock>,
    lock_timeout_millis: i64,
    boards: Mutex<HashMap<BoardId, SharedWorkspace>>,
}

impl BoardHub {
    pub fn new(
        repository: Arc<dyn BoardRepository>,
        clock: Arc<dyn Clock>,
        lock_timeout_millis: i64,
    ) -> Self {
        Self {
            repository,
            clock,
            lock_timeout_millis,
            boards: Mutex::new(HashMap::new()),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// 常駐ボードを返す。未読み込みなら Repository から読み込む
    pub async fn open(&self, board_id: &BoardId) -> Result<SharedWorkspace, RepositoryError> {
        if let Some(workspace) = self.resident(board_id).await {
            return Ok(workspace);
        }

        // 読み込み中に他のボードを止めないよう、ロックの外で読む
        let board = self.repository.load_board(board_id).await?;
        tracing::info!(
            "Loaded board '{}' ({} shapes, {} ops)",
            board_id,
            board.shapes().len(),
            board.ops().len()
        );

        let mut boards = self.boards.lock().await;
        let workspace = boards.entry(board_id.clone()).or_insert_with(|| {
            Arc::new(Mutex::new(BoardWorkspace {
                board,
                locks: LockTable::new(self.lock_timeout_millis),
            }))
        });
        Ok(workspace.clone())
    }

    pub async fn resident(&self, board_id: &BoardId) -> Option<SharedWorkspace> {
        let boards = self.boards.lock().await;
        boards.get(board_id).cloned()
    }

    pub async fn resident_boards(&self) -> Vec<(BoardId, SharedWorkspace)> {
        let boards = self.boards.lock().await;
        boards
            .iter()
            .map(|(id, workspace)| (id.clone(), workspace.clone()))
            .collect()
    }

    /// ボード全体を保存する
    pub async fn persist(&self, board: &Board) -> Result<(), RepositoryError> {
        self.repository.save_board(board).await.inspect_err(|e| {
            tracing::warn!("Failed to persist board '{}': {}", board.id, e);
        })
    }
}
