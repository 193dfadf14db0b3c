//! Core types and utilities shared by terrain and physics

pub mod types;
pub mod error;
pub mod logging;
pub mod time;
pub mod events;
pub mod input;

pub use types::*;
pub use error::Error;
