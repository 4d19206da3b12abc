//! Transport-agnostic wire protocol (spec §6.1).

pub mod events;

pub use events::{ClientEvent, GameType, ServerEvent};
