//! Repository 実装
//!
//! - `inmemory`: HashMap をストレージとして使う実装（開発・テスト用）
//! - `file`: ボードごとに JSON ドキュメントを 1 ファイル書き出す実装

pub mod file;
pub mod inmemory;

pub use file::FileBoardRepository;
pub use inmemory::InMemoryBoardRepository;
