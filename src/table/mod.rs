//! Table lifecycle: seats, timers, pure controller state, snapshot
//! projection, id generation, and the cross-worker registry (spec §4.5,
//! §4.6).

pub mod controller;
pub mod registry;
pub mod seats;
pub mod snapshot;
pub mod timers;
pub mod words;

pub use controller::TableState;
pub use registry::Registry;
