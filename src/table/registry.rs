//! Active-table registry (spec §4.6): tables keyed by id, with filtered
//! listing and collision-retrying id generation. Grounded in the teacher's
//! `ws::hub::GameSessionRegistry` (a `DashMap`-backed concurrent registry);
//! generalized from per-connection sessions to whole tables.

use dashmap::DashMap;

use crate::protocol::events::{GameType, TableOptions, TableSummary};
use crate::table::controller::TableState;
use crate::table::timers::TableTimers;
use crate::table::words::generate_table_id;

#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilter {
    pub game_type: Option<GameType>,
    pub include_in_progress: bool,
}

/// A table's pure state plus the timer bookkeeping the registry holds on
/// its behalf. Bundled in one map entry so both are locked together under
/// the same `DashMap` shard guard (spec §5's "actor with inbound mailbox"
/// concurrency model, approximated with per-key locking rather than a
/// literal actor mailbox).
pub struct TableEntry {
    pub state: TableState,
    pub timers: TableTimers,
}

pub struct Registry {
    tables: DashMap<String, TableEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self { tables: DashMap::new() }
    }

    pub fn create(&self, game_type: GameType, options: TableOptions) -> String {
        let id = generate_table_id(|candidate| self.tables.contains_key(candidate));
        let entry = TableEntry {
            state: TableState::new(id.clone(), game_type, options),
            timers: TableTimers::default(),
        };
        self.tables.insert(id.clone(), entry);
        id
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    pub fn with_table<R>(&self, id: &str, f: impl FnOnce(&mut TableState) -> R) -> Option<R> {
        self.tables.get_mut(id).map(|mut e| f(&mut e.state))
    }

    /// Like [`Registry::with_table`] but also exposes the table's timer
    /// slots, for callers that need to (re)arm or cancel a timer under the
    /// same lock as the state mutation that triggered it.
    pub fn with_entry<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut TableState, &mut TableTimers) -> R,
    ) -> Option<R> {
        self.tables.get_mut(id).map(|mut e| {
            let e = &mut *e;
            f(&mut e.state, &mut e.timers)
        })
    }

    pub fn remove(&self, id: &str) {
        self.tables.remove(id);
    }

    /// `listTables(filter)` (spec §4.6): waiting tables (player count < 4,
    /// no engine) always included; in-progress tables only when
    /// `include_in_progress` is set or a takeover seat is open.
    pub fn list(&self, filter: ListFilter) -> Vec<TableSummary> {
        self.tables
            .iter()
            .filter(|entry| match filter.game_type {
                Some(gt) => {
                    std::mem::discriminant(&gt) == std::mem::discriminant(&entry.value().state.game_type)
                }
                None => true,
            })
            .filter_map(|entry| {
                let t = &entry.value().state;
                let waiting = t.engine.is_none() && !t.seats.is_full();
                let has_takeover = t.seats.first_takeover_seat().is_some();
                let in_progress = t.engine.is_some();
                if waiting || has_takeover || (in_progress && filter.include_in_progress) {
                    Some(TableSummary {
                        id: t.id.clone(),
                        game_type: t.game_type,
                        player_count: t.seats.player_count() as u8,
                        has_engine: t.engine.is_some(),
                        spectatable: t.engine.is_some(),
                        has_takeover_seat: has_takeover,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Periodic sweep (spec §4.5 Cleanup / §5): a backstop alongside the
    /// per-table cleanup timer the shell arms on every mutation. Tables
    /// that are currently abandoned get removed outright; in practice the
    /// per-table timer already catches these within its 60s grace window,
    /// so this mostly guards against a timer that was somehow lost.
    pub fn sweep(&self) {
        let due: Vec<String> = self
            .tables
            .iter()
            .filter(|e| e.value().state.is_abandoned())
            .map(|e| e.key().clone())
            .collect();
        for id in due {
            self.tables.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_list_finds_waiting_table() {
        let reg = Registry::new();
        let id = reg.create(GameType::Hearts, TableOptions::default());
        let tables = reg.list(ListFilter::default());
        assert!(tables.iter().any(|t| t.id == id));
    }

    #[test]
    fn filter_by_game_type_excludes_others() {
        let reg = Registry::new();
        reg.create(GameType::King, TableOptions::default());
        let tables = reg.list(ListFilter { game_type: Some(GameType::Spades), include_in_progress: true });
        assert!(tables.is_empty());
    }
}
