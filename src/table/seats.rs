//! Seat and spectator bookkeeping for one table (spec §3 Player/Spectator,
//! §4.5 seat assignment / mid-game takeover).

use std::sync::Arc;

use crate::errors::ErrorCode;
use crate::transport::Outbound;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub seat: u8,
    pub connected: bool,
}

#[derive(Debug, Clone)]
pub struct Spectator {
    pub id: String,
    pub name: String,
}

#[derive(Default)]
pub struct Seats {
    pub players: [Option<Player>; 4],
    pub connections: [Option<Arc<dyn Outbound>>; 4],
    pub spectators: Vec<Spectator>,
    pub spectator_connections: Vec<(String, Arc<dyn Outbound>)>,
}

impl Seats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.player_count() == 4
    }

    pub fn is_empty_or_all_disconnected(&self) -> bool {
        self.players
            .iter()
            .all(|p| p.as_ref().map(|p| !p.connected).unwrap_or(true))
    }

    fn first_free_seat(&self) -> Option<u8> {
        (0..4u8).find(|&s| self.players[s as usize].is_none())
    }

    /// Seats a new player, or returns `None` if the table is full and no
    /// disconnected seat is available for takeover.
    pub fn first_takeover_seat(&self) -> Option<u8> {
        (0..4u8).find(|&s| {
            self.players[s as usize]
                .as_ref()
                .map(|p| !p.connected)
                .unwrap_or(false)
        })
    }

    /// Join a brand-new player into the first free seat (pre-game only; the
    /// caller is responsible for rejecting joins once an engine exists).
    pub fn join(&mut self, id: String, name: String, conn: Arc<dyn Outbound>) -> Result<u8, ErrorCode> {
        let seat = self.first_free_seat().ok_or(ErrorCode::TableFull)?;
        self.players[seat as usize] = Some(Player {
            id,
            name,
            seat,
            connected: true,
        });
        self.connections[seat as usize] = Some(conn);
        Ok(seat)
    }

    /// Rebind a disconnected seat's player record to a new connection
    /// (spec §4.5 mid-game takeover). Returns the rebound seat.
    pub fn takeover(&mut self, seat: u8, id: String, name: String, conn: Arc<dyn Outbound>) {
        self.players[seat as usize] = Some(Player {
            id,
            name,
            seat,
            connected: true,
        });
        self.connections[seat as usize] = Some(conn);
    }

    pub fn mark_disconnected(&mut self, seat: u8) {
        if let Some(player) = self.players[seat as usize].as_mut() {
            player.connected = false;
        }
        self.connections[seat as usize] = None;
    }

    pub fn add_spectator(&mut self, id: String, name: String, conn: Arc<dyn Outbound>) {
        self.spectators.push(Spectator { id: id.clone(), name });
        self.spectator_connections.push((id, conn));
    }

    pub fn remove_spectator(&mut self, id: &str) {
        self.spectators.retain(|s| s.id != id);
        self.spectator_connections.retain(|(sid, _)| sid != id);
    }

    pub fn seat_of(&self, player_id: &str) -> Option<u8> {
        self.players
            .iter()
            .flatten()
            .find(|p| p.id == player_id)
            .map(|p| p.seat)
    }
}
