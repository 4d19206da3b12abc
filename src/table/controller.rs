//! Pure table state machine (spec §4.5). This is deliberately not an actix
//! actor: every method takes `&mut self` plus the triggering input and
//! returns the list of outbound events to fan out, with no I/O and no
//! timers armed directly. `crate::ws::shell::run`/`run_with` is the thin
//! tokio shell around this that actually schedules delays and pushes bytes
//! down sockets via `crate::ws::session::WsSession` connections — the split
//! the spec's design notes ask for ("separate pure compute from mutation so
//! both can be property-tested").

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use rand::seq::IndexedRandom;
use time::OffsetDateTime;

use crate::cards::{Card, Suit};
use crate::engines::error::DomainError;
use crate::engines::hearts::HeartsEngine;
use crate::engines::king::{Contract, KingEngine, PenaltyName};
use crate::engines::spades::{Bid, SpadesEngine};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::protocol::events::{
    BidWire, ContractType, ContractWire, GameType, PlayerSummary, ServerEvent, TableOptions,
    TrickPlay,
};
use crate::table::seats::Seats;
use crate::table::snapshot::{GameEngine, Viewer};
use crate::table::timers::{BID_TIMER, PASS_TIMER, SELECT_TIMER, TURN_TIMER};
use crate::transport::Outbound;

const TRICK_END_DELAY: Duration = Duration::from_millis(500);
const ROUND_END_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy)]
pub enum Target {
    Seat(u8),
    Room,
    RoomExceptSeat(u8),
}

pub struct Outgoing {
    pub target: Target,
    pub event: ServerEvent,
    pub delay: Duration,
}

impl Outgoing {
    fn now(target: Target, event: ServerEvent) -> Self {
        Self { target, event, delay: Duration::ZERO }
    }

    fn delayed(target: Target, event: ServerEvent, delay: Duration) -> Self {
        Self { target, event, delay }
    }
}

fn timeout_at(duration: Duration) -> OffsetDateTime {
    OffsetDateTime::from(SystemTime::now() + duration)
}

pub struct TableState {
    pub id: String,
    pub game_type: GameType,
    pub options: TableOptions,
    pub seats: Seats,
    pub engine: Option<GameEngine>,
    pub rematch_votes: [Option<bool>; 4],
    pub typing: HashSet<u8>,
}

impl TableState {
    pub fn new(id: String, game_type: GameType, options: TableOptions) -> Self {
        Self {
            id,
            game_type,
            options,
            seats: Seats::new(),
            engine: None,
            rematch_votes: [None; 4],
            typing: HashSet::new(),
        }
    }

    pub fn player_summaries(&self) -> Vec<PlayerSummary> {
        self.seats
            .players
            .iter()
            .flatten()
            .map(|p| PlayerSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                seat: p.seat,
                connected: p.connected,
            })
            .collect()
    }

    /// spec §4.5: first free seat, or a disconnected seat's takeover if the
    /// table is full and mid-game.
    pub fn join(
        &mut self,
        player_id: String,
        player_name: String,
        conn: Arc<dyn Outbound>,
    ) -> Result<(u8, Vec<Outgoing>), ErrorCode> {
        if player_name.trim().is_empty() {
            return Err(ErrorCode::NameRequired);
        }

        if self.seats.is_full() {
            if self.engine.is_none() {
                return Err(ErrorCode::TableFull);
            }
            let seat = self.seats.first_takeover_seat().ok_or(ErrorCode::GameInProgress)?;
            self.seats.takeover(seat, player_id, player_name, conn);
            let mut out = vec![Outgoing::now(Target::Room, ServerEvent::UpdatePlayers {
                players: self.player_summaries(),
            })];
            out.extend(self.resync_seat(seat));
            return Ok((seat, out));
        }

        let seat = self.seats.join(player_id, player_name, conn)?;
        let mut out = vec![Outgoing::now(Target::Room, ServerEvent::UpdatePlayers {
            players: self.player_summaries(),
        })];
        if self.seats.is_full() && self.engine.is_none() {
            out.extend(self.start_game());
        }
        Ok((seat, out))
    }

    pub fn spectate(&mut self, id: String, name: String, conn: Arc<dyn Outbound>) -> Vec<Outgoing> {
        self.seats.add_spectator(id, name, conn);
        let game_state = self
            .engine
            .as_ref()
            .map(|e| e.snapshot(Viewer::Spectator))
            .unwrap_or(serde_json::Value::Null);
        vec![
            Outgoing::now(
                Target::Room,
                ServerEvent::SpectatorUpdate {
                    game_state: None,
                    spectator_count: Some(self.seats.spectators.len() as u32),
                },
            ),
            Outgoing::now(
                Target::Room,
                ServerEvent::SpectateJoined {
                    table_id: self.id.clone(),
                    game_type: self.game_type,
                    players: self.player_summaries(),
                    game_state,
                },
            ),
        ]
    }

    pub fn leave_spectate(&mut self, id: &str) {
        self.seats.remove_spectator(id);
    }

    /// Marks a seat disconnected. Does not destroy the table; cleanup
    /// scheduling is the actix shell's job (it owns the wall-clock timer).
    pub fn leave(&mut self, player_id: &str) -> Vec<Outgoing> {
        let Some(seat) = self.seats.seat_of(player_id) else {
            return Vec::new();
        };
        self.seats.mark_disconnected(seat);
        vec![Outgoing::now(Target::Room, ServerEvent::UpdatePlayers {
            players: self.player_summaries(),
        })]
    }

    fn resync_seat(&self, seat: u8) -> Vec<Outgoing> {
        let Some(engine) = &self.engine else { return Vec::new() };
        vec![Outgoing::now(
            Target::Seat(seat),
            ServerEvent::UpdateGame { game_state: engine.snapshot(Viewer::Player(seat)) },
        )]
    }

    fn start_game(&mut self) -> Vec<Outgoing> {
        match self.game_type {
            GameType::Hearts => {
                let ending_score = self.options.ending_score.unwrap_or(50);
                let engine = HeartsEngine::new(ending_score);
                let out = self.hearts_round_started(&engine);
                self.engine = Some(GameEngine::Hearts(engine));
                out
            }
            GameType::King => {
                let selector = self.options.initial_selector_seat.unwrap_or(0);
                let engine = KingEngine::new(selector);
                let out = self.king_game_started(&engine);
                self.engine = Some(GameEngine::King(engine));
                out
            }
            GameType::Spades => {
                let threshold = self.options.win_threshold.unwrap_or(300);
                let engine = SpadesEngine::new(threshold);
                let out = self.spades_round_started(&engine);
                self.engine = Some(GameEngine::Spades(engine));
                out
            }
        }
    }

    fn hearts_round_started(&self, e: &HeartsEngine) -> Vec<Outgoing> {
        let mut out: Vec<Outgoing> = (0..4u8)
            .map(|seat| {
                Outgoing::now(
                    Target::Seat(seat),
                    ServerEvent::StartGame {
                        hand: e.hands[seat as usize].clone(),
                        pass_direction: Some(format!("{:?}", e.pass_direction)),
                        phase: format!("{:?}", e.phase),
                        current_player: e.current_player,
                        game_type: GameType::Hearts,
                    },
                )
            })
            .collect();
        if e.pass_direction == crate::engines::hearts::PassDirection::Hold {
            out.push(Outgoing::now(Target::Seat(e.current_player), ServerEvent::TurnStart {
                player: e.current_player,
                timeout_at: timeout_at(TURN_TIMER),
            }));
        } else {
            out.push(Outgoing::now(Target::Room, ServerEvent::PassTimerStart {
                timeout_at: timeout_at(PASS_TIMER),
            }));
        }
        out
    }

    fn king_game_started(&self, e: &KingEngine) -> Vec<Outgoing> {
        let mut out: Vec<Outgoing> = (0..4u8)
            .map(|seat| {
                Outgoing::now(
                    Target::Seat(seat),
                    ServerEvent::StartGame {
                        hand: e.hands[seat as usize].clone(),
                        pass_direction: None,
                        phase: format!("{:?}", e.phase),
                        current_player: e.current_player,
                        game_type: GameType::King,
                    },
                )
            })
            .collect();
        let available_contracts: Vec<ContractWire> = PenaltyName::ALL
            .iter()
            .copied()
            .filter(|&n| e.available_penalties(e.selector_seat).contains(&n))
            .map(|n| ContractWire::Penalty { name: n })
            .chain(
                Suit::ALL
                    .iter()
                    .copied()
                    .filter(|&s| e.available_trumps(e.selector_seat).contains(&s))
                    .map(|s| ContractWire::Trump { suit: s }),
            )
            .collect();
        out.push(Outgoing::now(
            Target::Seat(e.selector_seat),
            ServerEvent::ContractSelectionStart {
                selector: e.selector_seat,
                available_contracts,
                game_number: e.game_number,
                party_number: e.game_number,
                hand: e.hands[e.selector_seat as usize].clone(),
            },
        ));
        out.push(Outgoing::now(Target::Room, ServerEvent::SelectTimerStart {
            timeout_at: timeout_at(SELECT_TIMER),
            selector_seat: e.selector_seat,
        }));
        out
    }

    fn spades_round_started(&self, e: &SpadesEngine) -> Vec<Outgoing> {
        let mut out: Vec<Outgoing> = (0..4u8)
            .map(|seat| {
                Outgoing::now(
                    Target::Seat(seat),
                    ServerEvent::StartGame {
                        hand: e.hands[seat as usize].clone(),
                        pass_direction: None,
                        phase: format!("{:?}", e.phase),
                        current_player: e.current_bidder,
                        game_type: GameType::Spades,
                    },
                )
            })
            .collect();
        out.push(Outgoing::now(
            Target::Seat(e.current_bidder),
            ServerEvent::BiddingStart {
                hand: e.hands[e.current_bidder as usize].clone(),
                current_bidder: e.current_bidder,
                round_number: e.round_number,
            },
        ));
        out.push(Outgoing::now(Target::Seat(e.current_bidder), ServerEvent::BidTimerStart {
            player: e.current_bidder,
            timeout_at: timeout_at(BID_TIMER),
        }));
        out
    }

    fn err_event(seat: u8, err: DomainError) -> Outgoing {
        let app_err: AppError = err.into();
        Outgoing::now(Target::Seat(seat), app_err.to_client_event())
    }

    pub fn submit_pass(&mut self, seat: u8, cards: Vec<Card>) -> Vec<Outgoing> {
        let Some(GameEngine::Hearts(e)) = &mut self.engine else {
            return vec![Self::err_event(seat, DomainError::PhaseError)];
        };
        match e.submit_pass(seat, cards) {
            Ok(all_done) => {
                let mut out = vec![Outgoing::now(
                    Target::Seat(seat),
                    ServerEvent::UpdateGame { game_state: e.snapshot(Viewer::Player(seat)) },
                )];
                if all_done {
                    out.extend((0..4u8).map(|s| {
                        Outgoing::now(
                            Target::Seat(s),
                            ServerEvent::UpdateGame { game_state: e.snapshot(Viewer::Player(s)) },
                        )
                    }));
                    out.push(Outgoing::now(Target::Seat(e.current_player), ServerEvent::TurnStart {
                        player: e.current_player,
                        timeout_at: timeout_at(TURN_TIMER),
                    }));
                }
                out
            }
            Err(err) => vec![Self::err_event(seat, err)],
        }
    }

    pub fn select_contract(
        &mut self,
        seat: u8,
        contract_type: ContractType,
        contract_name: Option<PenaltyName>,
        trump_suit: Option<Suit>,
    ) -> Vec<Outgoing> {
        let Some(GameEngine::King(e)) = &mut self.engine else {
            return vec![Self::err_event(seat, DomainError::PhaseError)];
        };
        let contract = match (contract_type, contract_name, trump_suit) {
            (ContractType::Penalty, Some(name), _) => Contract::Penalty(name),
            (ContractType::Trump, _, Some(suit)) => Contract::Trump(suit),
            _ => return vec![Self::err_event(seat, DomainError::InvalidContract)],
        };
        match e.select_contract(seat, contract) {
            Ok(()) => {
                let mut out = vec![Outgoing::now(Target::Room, ServerEvent::ContractSelected {
                    contract: contract.into(),
                    game_number: e.game_number,
                })];
                out.extend((0..4u8).map(|s| {
                    Outgoing::now(
                        Target::Seat(s),
                        ServerEvent::UpdateGame { game_state: e.snapshot(Viewer::Player(s)) },
                    )
                }));
                out.push(Outgoing::now(Target::Seat(e.current_player), ServerEvent::TurnStart {
                    player: e.current_player,
                    timeout_at: timeout_at(TURN_TIMER),
                }));
                out
            }
            Err(err) => vec![Self::err_event(seat, err)],
        }
    }

    pub fn submit_bid(&mut self, seat: u8, wire: BidWire) -> Vec<Outgoing> {
        let Some(GameEngine::Spades(e)) = &mut self.engine else {
            return vec![Self::err_event(seat, DomainError::PhaseError)];
        };
        let Ok(bid) = Bid::try_from(wire) else {
            return vec![Self::err_event(seat, DomainError::InvalidBid)];
        };
        match e.submit_bid(seat, bid) {
            Ok(all_submitted) => {
                let next_bidder = if all_submitted { None } else { Some(e.current_bidder) };
                let mut out = vec![Outgoing::now(Target::Room, ServerEvent::BidSubmitted {
                    seat,
                    bid: bid.into(),
                    bids: e.bids.iter().map(|b| b.map(BidWire::from)).collect(),
                    next_bidder,
                })];
                if all_submitted {
                    out.extend((0..4u8).map(|s| {
                        Outgoing::now(
                            Target::Seat(s),
                            ServerEvent::UpdateGame { game_state: e.snapshot(Viewer::Player(s)) },
                        )
                    }));
                    out.push(Outgoing::now(Target::Seat(e.current_player), ServerEvent::TurnStart {
                        player: e.current_player,
                        timeout_at: timeout_at(TURN_TIMER),
                    }));
                } else {
                    out.push(Outgoing::now(Target::Seat(e.current_bidder), ServerEvent::BidTimerStart {
                        player: e.current_bidder,
                        timeout_at: timeout_at(BID_TIMER),
                    }));
                }
                out
            }
            Err(err) => vec![Self::err_event(seat, err)],
        }
    }

    pub fn play_card(&mut self, seat: u8, card: Card) -> Vec<Outgoing> {
        match &mut self.engine {
            Some(GameEngine::Hearts(e)) => {
                let trick: Vec<(u8, Card)> = e.current_trick.clone();
                match e.play_card(seat, card) {
                    Ok(outcome) => {
                        let mut out = vec![Outgoing::now(Target::Room, ServerEvent::CardPlayed {
                            seat,
                            card,
                            current_trick: as_trick_plays(&trick, seat, card),
                            trick_complete: Some(outcome.trick_complete),
                            winner: outcome.trick_winner,
                        })];
                        if outcome.trick_complete {
                            let winner = outcome.trick_winner.unwrap();
                            let last_trick = e.last_trick.clone().unwrap_or_default();
                            let points: i32 = last_trick
                                .iter()
                                .map(|(_, c)| if c.is_queen_of_spades() { 13 } else if c.suit == Suit::Hearts { 1 } else { 0 })
                                .sum();
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::TrickEnd {
                                    winner,
                                    points,
                                    last_trick: last_trick.into_iter().map(|(s, c)| TrickPlay { seat: s, card: c }).collect(),
                                },
                                TRICK_END_DELAY,
                            ));
                        }
                        if outcome.round_complete {
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::RoundEnd {
                                    round_scores: e.round_scores.to_vec(),
                                    cumulative_scores: e.cumulative_scores.to_vec(),
                                    moon_shooter: e.moon_shooter,
                                    point_cards_taken: e.tricks_taken.to_vec(),
                                    game_over: outcome.game_complete,
                                    game_winner: if outcome.game_complete { Some(e.winners()) } else { None },
                                },
                                TRICK_END_DELAY + ROUND_END_DELAY,
                            ));
                        }
                        if outcome.game_complete {
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::GameEnd {
                                    winner: e.winners(),
                                    final_scores: e.cumulative_scores.to_vec(),
                                },
                                TRICK_END_DELAY + ROUND_END_DELAY,
                            ));
                        } else if outcome.trick_complete {
                            out.push(Outgoing::delayed(
                                Target::Seat(e.current_player),
                                ServerEvent::TurnStart {
                                    player: e.current_player,
                                    timeout_at: timeout_at(TURN_TIMER),
                                },
                                TRICK_END_DELAY,
                            ));
                        } else {
                            out.push(Outgoing::now(Target::Seat(e.current_player), ServerEvent::TurnStart {
                                player: e.current_player,
                                timeout_at: timeout_at(TURN_TIMER),
                            }));
                        }
                        out
                    }
                    Err(err) => vec![Self::err_event(seat, err)],
                }
            }
            Some(GameEngine::King(e)) => {
                let trick: Vec<(u8, Card)> = e.current_trick.clone();
                match e.play_card(seat, card) {
                    Ok(outcome) => {
                        let mut out = vec![Outgoing::now(Target::Room, ServerEvent::CardPlayed {
                            seat,
                            card,
                            current_trick: as_trick_plays(&trick, seat, card),
                            trick_complete: Some(outcome.trick_complete),
                            winner: outcome.trick_winner,
                        })];
                        if outcome.trick_complete {
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::TrickEnd {
                                    winner: outcome.trick_winner.unwrap(),
                                    points: 0,
                                    last_trick: Vec::new(),
                                },
                                TRICK_END_DELAY,
                            ));
                        }
                        if outcome.game_complete {
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::RoundEnd {
                                    round_scores: e.game_scores.to_vec(),
                                    cumulative_scores: e.cumulative_scores.to_vec(),
                                    moon_shooter: None,
                                    point_cards_taken: e.tricks_taken.to_vec(),
                                    game_over: outcome.party_complete,
                                    game_winner: if outcome.party_complete { Some(e.party_winners()) } else { None },
                                },
                                TRICK_END_DELAY + ROUND_END_DELAY,
                            ));
                        }
                        if outcome.party_complete {
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::GameEnd {
                                    winner: e.party_winners(),
                                    final_scores: e.cumulative_scores.to_vec(),
                                },
                                TRICK_END_DELAY + ROUND_END_DELAY,
                            ));
                        } else if outcome.trick_complete && !outcome.game_complete {
                            out.push(Outgoing::delayed(
                                Target::Seat(e.current_player),
                                ServerEvent::TurnStart {
                                    player: e.current_player,
                                    timeout_at: timeout_at(TURN_TIMER),
                                },
                                TRICK_END_DELAY,
                            ));
                        } else if !outcome.trick_complete {
                            out.push(Outgoing::now(Target::Seat(e.current_player), ServerEvent::TurnStart {
                                player: e.current_player,
                                timeout_at: timeout_at(TURN_TIMER),
                            }));
                        }
                        out
                    }
                    Err(err) => vec![Self::err_event(seat, err)],
                }
            }
            Some(GameEngine::Spades(e)) => {
                let trick: Vec<(u8, Card)> = e.current_trick.clone();
                match e.play_card(seat, card) {
                    Ok(outcome) => {
                        let mut out = vec![Outgoing::now(Target::Room, ServerEvent::CardPlayed {
                            seat,
                            card,
                            current_trick: as_trick_plays(&trick, seat, card),
                            trick_complete: Some(outcome.trick_complete),
                            winner: outcome.trick_winner,
                        })];
                        if outcome.trick_complete {
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::TrickEnd {
                                    winner: outcome.trick_winner.unwrap(),
                                    points: 0,
                                    last_trick: Vec::new(),
                                },
                                TRICK_END_DELAY,
                            ));
                        }
                        if outcome.round_complete {
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::RoundEnd {
                                    round_scores: e.round_scores.to_vec(),
                                    cumulative_scores: e.cumulative_scores.to_vec(),
                                    moon_shooter: None,
                                    point_cards_taken: Vec::new(),
                                    game_over: outcome.game_complete,
                                    game_winner: if outcome.game_complete {
                                        Some(e.winning_teams().into_iter().map(|t| t as u8).collect())
                                    } else {
                                        None
                                    },
                                },
                                TRICK_END_DELAY + ROUND_END_DELAY,
                            ));
                        }
                        if outcome.game_complete {
                            out.push(Outgoing::delayed(
                                Target::Room,
                                ServerEvent::GameEnd {
                                    winner: e.winning_teams().into_iter().map(|t| t as u8).collect(),
                                    final_scores: e.cumulative_scores.to_vec(),
                                },
                                TRICK_END_DELAY + ROUND_END_DELAY,
                            ));
                        } else if outcome.trick_complete {
                            out.push(Outgoing::delayed(
                                Target::Seat(e.current_player),
                                ServerEvent::TurnStart {
                                    player: e.current_player,
                                    timeout_at: timeout_at(TURN_TIMER),
                                },
                                TRICK_END_DELAY,
                            ));
                        } else {
                            out.push(Outgoing::now(Target::Seat(e.current_player), ServerEvent::TurnStart {
                                player: e.current_player,
                                timeout_at: timeout_at(TURN_TIMER),
                            }));
                        }
                        out
                    }
                    Err(err) => vec![Self::err_event(seat, err)],
                }
            }
            None => vec![Self::err_event(seat, DomainError::PhaseError)],
        }
    }

    /// Lowest legal card for a seat, by the engine's canonical `Ord` (used
    /// by the turn-timer auto-play, spec §4.5 Timers table).
    pub fn legal_plays(&self, seat: u8) -> Vec<Card> {
        match &self.engine {
            Some(GameEngine::Hearts(e)) => e.legal_plays(seat),
            Some(GameEngine::King(e)) => e.legal_plays(seat),
            Some(GameEngine::Spades(e)) => e.legal_plays(seat),
            None => Vec::new(),
        }
    }

    pub fn submit_rematch_vote(&mut self, seat: u8, vote: bool) -> Vec<Outgoing> {
        self.rematch_votes[seat as usize] = Some(vote);
        let mut out = vec![Outgoing::now(Target::Room, ServerEvent::RematchStatus { votes: self.rematch_votes })];
        if self.rematch_votes.iter().all(|v| *v == Some(true)) {
            self.rematch_votes = [None; 4];
            self.engine = None;
            out.extend(self.start_game());
        }
        out
    }

    pub fn chat(&self, from_seat: u8, from_name: &str, text: &str) -> Vec<Outgoing> {
        let sanitized = sanitize_chat(text);
        vec![Outgoing::now(
            Target::Room,
            ServerEvent::Chat {
                from: from_name.to_string(),
                seat: from_seat,
                text: sanitized,
                timestamp: OffsetDateTime::from(SystemTime::now()),
            },
        )]
    }

    /// spec §4.5 Timers table: a turn that runs out auto-plays the first
    /// entry of the seat's own legal-card set. A no-op if the seat is no
    /// longer on turn (the shell's timer lost a race with a real play).
    pub fn on_turn_timeout(&mut self, seat: u8) -> Vec<Outgoing> {
        let legal = self.legal_plays(seat);
        let Some(&card) = legal.first() else { return Vec::new() };
        let mut out = vec![Outgoing::now(Target::Room, ServerEvent::AutoPlay { card })];
        out.extend(self.play_card(seat, card));
        out
    }

    /// For every seat that missed the 30s pass window, submit its
    /// deterministic auto-pass (spec's Timers table: "select 3 random hand
    /// cards" — `HeartsEngine::auto_pass_cards` picks a fixed first-3 so the
    /// outcome stays reproducible under test).
    pub fn on_pass_timeout(&mut self) -> Vec<Outgoing> {
        let pending: Vec<(u8, Vec<Card>)> = match &self.engine {
            Some(GameEngine::Hearts(e)) => {
                e.legal_passers().into_iter().map(|s| (s, e.auto_pass_cards(s))).collect()
            }
            _ => Vec::new(),
        };
        let mut out = Vec::new();
        for (seat, cards) in pending {
            out.push(Outgoing::now(
                Target::Seat(seat),
                ServerEvent::AutoPassSubmitted { cards: cards.clone() },
            ));
            out.extend(self.submit_pass(seat, cards));
        }
        out
    }

    /// King's 45s select timer: random available penalty if one is still
    /// open, otherwise a random available trump suit (spec's Timers table).
    pub fn on_select_timeout(&mut self) -> Vec<Outgoing> {
        let Some(GameEngine::King(e)) = &self.engine else { return Vec::new() };
        let seat = e.selector_seat;
        let penalties = e.available_penalties(seat);
        let trumps = e.available_trumps(seat);
        let mut rng = rand::rng();
        let contract = if !penalties.is_empty() {
            penalties.choose(&mut rng).copied().map(Contract::Penalty)
        } else {
            trumps.choose(&mut rng).copied().map(Contract::Trump)
        };
        match contract {
            Some(Contract::Penalty(name)) => {
                self.select_contract(seat, ContractType::Penalty, Some(name), None)
            }
            Some(Contract::Trump(suit)) => {
                self.select_contract(seat, ContractType::Trump, None, Some(suit))
            }
            None => Vec::new(),
        }
    }

    /// Spades' 30s bid timer: auto-bid a flat `2` (no auto-nil, spec's
    /// Timers table).
    pub fn on_bid_timeout(&mut self) -> Vec<Outgoing> {
        let Some(GameEngine::Spades(e)) = &self.engine else { return Vec::new() };
        let seat = e.current_bidder;
        self.submit_bid(seat, BidWire::Number(2))
    }

    pub fn turn_timer_warning(&self, seat: u8) -> Vec<Outgoing> {
        vec![Outgoing::now(Target::Seat(seat), ServerEvent::TimerWarning {})]
    }

    /// Table is eligible for cleanup once every seat is empty or
    /// disconnected and no spectators remain (spec §4.6 sweep).
    pub fn is_abandoned(&self) -> bool {
        self.seats.is_empty_or_all_disconnected() && self.seats.spectators.is_empty()
    }

    pub fn typing(&mut self, seat: u8, is_typing: bool) -> Vec<Outgoing> {
        if is_typing {
            self.typing.insert(seat);
        } else {
            self.typing.remove(&seat);
        }
        let names: Vec<String> = self
            .typing
            .iter()
            .filter_map(|&s| self.seats.players[s as usize].as_ref().map(|p| p.name.clone()))
            .collect();
        vec![Outgoing::now(Target::RoomExceptSeat(seat), ServerEvent::TypingUpdate { players: names })]
    }
}

fn targets_for(seats: &Seats, target: Target) -> Vec<Arc<dyn Outbound>> {
    match target {
        Target::Seat(s) => seats.connections[s as usize].iter().cloned().collect(),
        Target::Room => seats
            .connections
            .iter()
            .flatten()
            .cloned()
            .chain(seats.spectator_connections.iter().map(|(_, c)| c.clone()))
            .collect(),
        Target::RoomExceptSeat(exclude) => seats
            .connections
            .iter()
            .enumerate()
            .filter(|(i, _)| *i as u8 != exclude)
            .filter_map(|(_, c)| c.clone())
            .chain(seats.spectator_connections.iter().map(|(_, c)| c.clone()))
            .collect(),
    }
}

/// Send every zero-delay event immediately (while the registry's per-table
/// lock is still held by the caller) and hand back the delayed ones for the
/// caller to schedule with `tokio::spawn` once the lock is released — the
/// spec's "ordering guarantee" (cardPlayed, then trickEnd after 500ms, then
/// roundEnd/gameEnd) without blocking the table on animation gaps (§5).
pub fn dispatch(seats: &Seats, outgoing: Vec<Outgoing>) -> Vec<(Duration, Arc<dyn Outbound>, ServerEvent)> {
    let mut pending = Vec::new();
    for item in outgoing {
        let conns = targets_for(seats, item.target);
        if item.delay.is_zero() {
            for c in conns {
                c.send(item.event.clone());
            }
        } else {
            for c in conns {
                pending.push((item.delay, c, item.event.clone()));
            }
        }
    }
    pending
}

fn as_trick_plays(before: &[(u8, Card)], seat: u8, card: Card) -> Vec<TrickPlay> {
    let mut plays: Vec<TrickPlay> = before.iter().map(|&(s, c)| TrickPlay { seat: s, card: c }).collect();
    plays.push(TrickPlay { seat, card });
    plays
}

/// spec §4.5 Chat: Unicode letters/digits + basic punctuation + the named
/// Turkish letters survive; everything else (including over-length input)
/// is stripped/truncated. Input is NFC-normalized first so a combining-mark
/// spelling of a Turkish letter (e.g. "s" + combining cedilla) filters the
/// same as its precomposed form.
fn sanitize_chat(text: &str) -> String {
    use unicode_normalization::UnicodeNormalization;

    const ALLOWED_EXTRA: &str = ".,!?'\"-:; ";
    const TURKISH_EXTRA: &str = "çÇğĞıİöÖşŞüÜ";
    let normalized: String = text.nfc().collect();
    let filtered: String = normalized
        .chars()
        .filter(|c| c.is_alphanumeric() || ALLOWED_EXTRA.contains(*c) || TURKISH_EXTRA.contains(*c))
        .collect();
    filtered.chars().take(140).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Sink(Mutex<Vec<ServerEvent>>);
    impl Outbound for Sink {
        fn send(&self, event: ServerEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn conn() -> Arc<dyn Outbound> {
        Arc::new(Sink(Mutex::new(Vec::new())))
    }

    #[test]
    fn four_joins_deals_and_arms_a_timer() {
        let mut t = TableState::new("velvet-otter".into(), GameType::Hearts, TableOptions::default());
        for i in 0..4 {
            let (_, out) = t.join(format!("p{i}"), format!("player{i}"), conn()).unwrap();
            if i < 3 {
                assert!(out.iter().all(|o| !matches!(o.event, ServerEvent::StartGame { .. })));
            }
        }
        assert!(t.engine.is_some());
    }

    #[test]
    fn fifth_join_is_rejected_when_full_and_no_engine() {
        let mut t = TableState::new("id".into(), GameType::Hearts, TableOptions::default());
        for i in 0..4 {
            t.join(format!("p{i}"), format!("n{i}"), conn()).unwrap();
        }
        // Engine now exists after the 4th join, so this checks the
        // takeover-only path rejects a 5th brand-new player when every seat
        // is connected.
        let err = t.join("p5".into(), "n5".into(), conn()).unwrap_err();
        assert_eq!(err, ErrorCode::GameInProgress);
    }

    #[test]
    fn chat_strips_disallowed_characters_and_truncates() {
        let long = "a".repeat(200);
        let sanitized = sanitize_chat(&long);
        assert_eq!(sanitized.len(), 140);
        assert_eq!(sanitize_chat("hi <script>"), "hi script");
    }

    #[test]
    fn chat_normalizes_combining_turkish_letters_before_filtering() {
        // "s" + U+0327 COMBINING CEDILLA decomposed form of s-cedilla.
        let decomposed = "merhaba s\u{0327}ey";
        let precomposed = "merhaba şey";
        assert_eq!(sanitize_chat(decomposed), precomposed);
    }
}
