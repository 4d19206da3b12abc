//! Rule engines: one module per game, each a pure state machine driven by
//! `submit_*`/`play_card` calls and queried via `legal_*` predicates. No
//! engine knows about transport, seats-vs-connections, or timers; the Table
//! Controller (`crate::table`) owns all of that.

pub mod error;
pub mod hearts;
pub mod king;
pub mod spades;
