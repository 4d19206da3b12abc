//! The thin tokio shell around the pure [`TableState`] machine (spec §9:
//! "separate pure compute from mutation"; §5 "single logical worker per
//! table"). `run` performs one state mutation under the registry's per-key
//! lock, arms/cancels whatever timers the resulting events imply, and
//! schedules delayed broadcasts once the lock is released. The timer-fired
//! functions below re-enter the same `run`-shaped pipeline from a spawned
//! task instead of a client event.

use std::sync::Arc;
use std::time::Duration;

use crate::protocol::events::ServerEvent;
use crate::table::controller::{self, Outgoing, TableState};
use crate::table::registry::Registry;
use crate::table::timers::{
    TableTimers, BID_TIMER, CLEANUP_GRACE, PASS_TIMER, SELECT_TIMER, TURN_TIMER,
    TURN_WARNING_REMAINING, TYPING_EXPIRY,
};
use crate::transport::Outbound;

/// Runs `f` against one table's state, arms timers implied by the events it
/// returns, dispatches them, and hands back whatever side value `f` wants
/// to report (e.g. the seat a join landed on). Returns `None` if the table
/// no longer exists (cleaned up or never existed).
pub fn run_with<R>(
    registry: &Arc<Registry>,
    table_id: &str,
    f: impl FnOnce(&mut TableState) -> (Vec<Outgoing>, R),
) -> Option<R> {
    let out = registry.with_entry(table_id, |state, timers| {
        let (events, result) = f(state);
        arm_timers(timers, &events, registry.clone(), table_id.to_string());
        if state.is_abandoned() {
            arm_cleanup(timers, registry.clone(), table_id.to_string());
        } else {
            timers.cleanup.cancel();
        }
        let pending = controller::dispatch(&state.seats, events);
        (pending, result)
    });
    out.map(|(pending, result)| {
        schedule(pending);
        result
    })
}

/// Convenience wrapper for the common case of no side value. Returns
/// `false` if the table no longer exists.
pub fn run(registry: &Arc<Registry>, table_id: &str, f: impl FnOnce(&mut TableState) -> Vec<Outgoing>) -> bool {
    run_with(registry, table_id, |state| (f(state), ())).is_some()
}

/// Submits a typing-indicator change and arms/cancels that seat's own
/// expiry timer (spec §4.5: typing self-expires after ~2.5s of
/// inactivity). Kept separate from `run`/`run_with` since the generic
/// event-matching in `arm_timers` has no way to tell which seat a
/// `TypingUpdate` event is about. Returns `false` if the table no longer
/// exists.
pub fn typing(registry: &Arc<Registry>, table_id: &str, seat: u8, is_typing: bool) -> bool {
    let reg = registry.clone();
    let tid = table_id.to_string();
    let out = registry.with_entry(table_id, |state, timers| {
        let events = state.typing(seat, is_typing);
        if is_typing {
            arm_typing(timers, reg, tid, seat);
        } else {
            timers.typing[seat as usize].cancel();
        }
        controller::dispatch(&state.seats, events)
    });
    match out {
        Some(pending) => {
            schedule(pending);
            true
        }
        None => false,
    }
}

fn schedule(pending: Vec<(Duration, Arc<dyn Outbound>, ServerEvent)>) {
    for (delay, conn, event) in pending {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            conn.send(event);
        });
    }
}

fn arm_timers(timers: &mut TableTimers, events: &[Outgoing], registry: Arc<Registry>, table_id: String) {
    for out in events {
        match &out.event {
            ServerEvent::TurnStart { player, .. } => {
                arm_turn(timers, registry.clone(), table_id.clone(), *player);
            }
            ServerEvent::PassTimerStart { .. } => {
                arm_pass(timers, registry.clone(), table_id.clone());
            }
            ServerEvent::SelectTimerStart { .. } => {
                arm_select(timers, registry.clone(), table_id.clone());
            }
            ServerEvent::BidTimerStart { .. } => {
                arm_bid(timers, registry.clone(), table_id.clone());
            }
            _ => {}
        }
    }
}

fn arm_turn(timers: &mut TableTimers, registry: Arc<Registry>, table_id: String, seat: u8) {
    let warn_generation = timers.turn_warning.bump();
    let reg = registry.clone();
    let tid = table_id.clone();
    let warn_handle = tokio::spawn(async move {
        tokio::time::sleep(TURN_TIMER - TURN_WARNING_REMAINING).await;
        fire_turn_warning(&reg, &tid, seat, warn_generation);
    });
    timers.turn_warning.set_handle(warn_handle.abort_handle());

    let generation = timers.turn.bump();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(TURN_TIMER).await;
        fire_turn_timeout(&registry, &table_id, seat, generation);
    });
    timers.turn.set_handle(handle.abort_handle());
}

fn arm_pass(timers: &mut TableTimers, registry: Arc<Registry>, table_id: String) {
    let generation = timers.pass.bump();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(PASS_TIMER).await;
        fire_pass_timeout(&registry, &table_id, generation);
    });
    timers.pass.set_handle(handle.abort_handle());
}

fn arm_select(timers: &mut TableTimers, registry: Arc<Registry>, table_id: String) {
    let generation = timers.select.bump();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(SELECT_TIMER).await;
        fire_select_timeout(&registry, &table_id, generation);
    });
    timers.select.set_handle(handle.abort_handle());
}

fn arm_bid(timers: &mut TableTimers, registry: Arc<Registry>, table_id: String) {
    let generation = timers.bid.bump();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(BID_TIMER).await;
        fire_bid_timeout(&registry, &table_id, generation);
    });
    timers.bid.set_handle(handle.abort_handle());
}

fn arm_cleanup(timers: &mut TableTimers, registry: Arc<Registry>, table_id: String) {
    let generation = timers.cleanup.bump();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(CLEANUP_GRACE).await;
        fire_cleanup(&registry, &table_id, generation);
    });
    timers.cleanup.set_handle(handle.abort_handle());
}

fn arm_typing(timers: &mut TableTimers, registry: Arc<Registry>, table_id: String, seat: u8) {
    let generation = timers.typing[seat as usize].bump();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(TYPING_EXPIRY).await;
        fire_typing_expiry(&registry, &table_id, seat, generation);
    });
    timers.typing[seat as usize].set_handle(handle.abort_handle());
}

fn fire_typing_expiry(registry: &Arc<Registry>, table_id: &str, seat: u8, generation: u64) {
    let pending = registry.with_entry(table_id, |state, timers| {
        if !timers.typing[seat as usize].is_current(generation) {
            return None;
        }
        Some(controller::dispatch(&state.seats, state.typing(seat, false)))
    });
    if let Some(Some(pending)) = pending {
        schedule(pending);
    }
}

fn fire_turn_warning(registry: &Arc<Registry>, table_id: &str, seat: u8, generation: u64) {
    let pending = registry.with_entry(table_id, |state, timers| {
        if !timers.turn_warning.is_current(generation) {
            return None;
        }
        Some(controller::dispatch(&state.seats, state.turn_timer_warning(seat)))
    });
    if let Some(Some(pending)) = pending {
        schedule(pending);
    }
}

fn fire_turn_timeout(registry: &Arc<Registry>, table_id: &str, seat: u8, generation: u64) {
    let reg = registry.clone();
    let tid = table_id.to_string();
    let pending = registry.with_entry(table_id, |state, timers| {
        if !timers.turn.is_current(generation) {
            return None;
        }
        let events = state.on_turn_timeout(seat);
        arm_timers(timers, &events, reg, tid);
        Some(controller::dispatch(&state.seats, events))
    });
    if let Some(Some(pending)) = pending {
        schedule(pending);
    }
}

fn fire_pass_timeout(registry: &Arc<Registry>, table_id: &str, generation: u64) {
    let reg = registry.clone();
    let tid = table_id.to_string();
    let pending = registry.with_entry(table_id, |state, timers| {
        if !timers.pass.is_current(generation) {
            return None;
        }
        let events = state.on_pass_timeout();
        arm_timers(timers, &events, reg, tid);
        Some(controller::dispatch(&state.seats, events))
    });
    if let Some(Some(pending)) = pending {
        schedule(pending);
    }
}

fn fire_select_timeout(registry: &Arc<Registry>, table_id: &str, generation: u64) {
    let reg = registry.clone();
    let tid = table_id.to_string();
    let pending = registry.with_entry(table_id, |state, timers| {
        if !timers.select.is_current(generation) {
            return None;
        }
        let events = state.on_select_timeout();
        arm_timers(timers, &events, reg, tid);
        Some(controller::dispatch(&state.seats, events))
    });
    if let Some(Some(pending)) = pending {
        schedule(pending);
    }
}

fn fire_bid_timeout(registry: &Arc<Registry>, table_id: &str, generation: u64) {
    let reg = registry.clone();
    let tid = table_id.to_string();
    let pending = registry.with_entry(table_id, |state, timers| {
        if !timers.bid.is_current(generation) {
            return None;
        }
        let events = state.on_bid_timeout();
        arm_timers(timers, &events, reg, tid);
        Some(controller::dispatch(&state.seats, events))
    });
    if let Some(Some(pending)) = pending {
        schedule(pending);
    }
}

fn fire_cleanup(registry: &Arc<Registry>, table_id: &str, generation: u64) {
    let should_remove = registry
        .with_entry(table_id, |state, timers| {
            timers.cleanup.is_current(generation) && state.is_abandoned()
        })
        .unwrap_or(false);
    if should_remove {
        registry.remove(table_id);
    }
}
