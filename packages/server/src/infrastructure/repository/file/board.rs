//! JSON ファイル Board Repository 実装
//!
//! ボードごとに `<root>/<boardId>.json` を 1 ファイル保持します。
//! 書き込みは一時ファイルに書いてから rename するため、読み込み側が
//! 書きかけのドキュメントを見ることはありません。

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::domain::{Board, BoardId, BoardRepository, RepositoryError};

/// JSON ファイル Board Repository 実装
pub struct FileBoardRepository {
    root: PathBuf,
}

impl FileBoardRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 保存先ディレクトリを作成してから Repository を返す
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let repo = Self::new(root);
        tokio::fs::create_dir_all(&repo.root)
            .await
            .map_err(|e| RepositoryError::Io(e.to_string()))?;
        Ok(repo)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, board_id: &BoardId) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(board_id)))
    }
}

/// ボード ID をファイル名として安全な形に変換する
fn file_stem(board_id: &BoardId) -> String {
    board_id
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl BoardRepository for FileBoardRepository {
    async fn load_board(&self, board_id: &BoardId) -> Result<Board, RepositoryError> {
        let path = self.document_path(board_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RepositoryError::BoardNotFound(board_id.to_string()));
            }
            Err(e) => return Err(RepositoryError::Io(e.to_string())),
        };

        let board: Board = serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        if &board.id != board_id {
            return Err(RepositoryError::Serialization(format!(
                "document {} holds board '{}'",
                path.display(),
                board.id
            )));
        }
        Ok(board)
    }

    async fn save_board(&self, board: &Board) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec_pretty(board)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let path = self.document_path(&board.id);
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| RepositoryError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| RepositoryError::Io(e.to_string()))?;

        tracing::debug!(
            "Saved board '{}' ({} ops) to {}",
            board.id,
            board.ops().len(),
            path.display()
        );
        Ok(())
    }
}
