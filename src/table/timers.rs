//! Timer bookkeeping (spec §4.5, §9 "generation counter on the mailbox
//! entry"). `TableState` stays a plain struct with no async dependencies;
//! `TableTimers` is the bookkeeping the registry keeps alongside it so the
//! `tokio::spawn`-based shell (`crate::ws::session`) can cancel a stale
//! timer outright via its `AbortHandle` *and* recognize one that already
//! fired in flight via the generation counter, instead of acting on it twice.

use std::time::Duration;

use tokio::task::AbortHandle;

pub const TURN_TIMER: Duration = Duration::from_secs(30);
pub const TURN_WARNING_REMAINING: Duration = Duration::from_secs(10);
pub const PASS_TIMER: Duration = Duration::from_secs(30);
pub const SELECT_TIMER: Duration = Duration::from_secs(45);
pub const BID_TIMER: Duration = Duration::from_secs(30);
pub const CLEANUP_GRACE: Duration = Duration::from_secs(60);
pub const TYPING_EXPIRY: Duration = Duration::from_millis(2500);

#[derive(Default)]
pub struct TimerSlot {
    handle: Option<AbortHandle>,
    generation: u64,
}

impl TimerSlot {
    /// Advance the generation and cancel whatever was previously armed,
    /// returning the new generation for the caller to tag the scheduled
    /// message with (checked later in [`TimerSlot::is_current`]).
    pub fn bump(&mut self) -> u64 {
        if let Some(old) = self.handle.take() {
            old.abort();
        }
        self.generation += 1;
        self.generation
    }

    /// Record the handle of the task just spawned for the generation
    /// returned by the preceding `bump`.
    pub fn set_handle(&mut self, handle: AbortHandle) {
        self.handle = Some(handle);
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

#[derive(Default)]
pub struct TableTimers {
    pub turn: TimerSlot,
    pub turn_warning: TimerSlot,
    pub pass: TimerSlot,
    pub select: TimerSlot,
    pub bid: TimerSlot,
    pub cleanup: TimerSlot,
    /// One slot per seat: each seat's typing indicator self-expires
    /// independently of the others (spec §4.5).
    pub typing: [TimerSlot; 4],
}

impl TableTimers {
    pub fn cancel_all(&mut self) {
        self.turn.cancel();
        self.turn_warning.cancel();
        self.pass.cancel();
        self.select.cancel();
        self.bid.cancel();
        for slot in &mut self.typing {
            slot.cancel();
        }
    }
}
