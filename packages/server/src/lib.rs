//! Real-time collaboration engine for a shared whiteboard.
//!
//! Clients connect over WebSocket, join a board and exchange drawing, shape,
//! lock, undo and cursor events. Each board keeps an authoritative shape set
//! and an append-only op log; edits are serialized per board and fanned out to
//! every connection in the board's room in the same order.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
