mod http;
mod websocket;

pub use http::{get_board_summary, health_check};
pub use websocket::websocket_handler;
