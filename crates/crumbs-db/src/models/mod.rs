//! Database models for persistent storage.

mod player;
mod upgrade;

pub use player::*;
pub use upgrade::*;
