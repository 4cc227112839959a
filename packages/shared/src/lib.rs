//! Utilities shared by the Shoji packages.

pub mod logger;
pub mod time;
