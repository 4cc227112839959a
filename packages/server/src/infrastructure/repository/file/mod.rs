pub mod board;

pub use board::FileBoardRepository;
