//! WebSocket session actor: bridges one live connection to the table
//! registry. Grounded in the teacher's `ws::session::WsSession` (heartbeat,
//! `StreamHandler<Result<ws::Message, _>>`, `Handler<OutboundMessage>`),
//! generalized from a single authenticated-user connection to an
//! identity-free per-table seat/spectator connection (spec §4.5, §6.1).

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ErrorCode;
use crate::protocol::events::{ClientEvent, ServerEvent};
use crate::table::registry::{ListFilter, Registry};
use crate::transport::{Outbound, OutboundMessage, WsTransport};
use crate::ws::shell;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    registry: web::Data<Arc<Registry>>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(registry.get_ref().clone());
    ws::start(session, &req, stream)
}

enum Location {
    Seated { table_id: String, seat: u8 },
    Spectating { table_id: String },
}

pub struct WsSession {
    conn_id: String,
    registry: Arc<Registry>,
    location: Option<Location>,
    last_heartbeat: Instant,
    heartbeat_handle: Option<SpawnHandle>,
}

impl WsSession {
    fn new(registry: Arc<Registry>) -> Self {
        Self {
            conn_id: Uuid::new_v4().to_string(),
            registry,
            location: None,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound event"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, code: ErrorCode) {
        Self::send_json(ctx, &ServerEvent::Error { message: code.default_message().to_string() });
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    fn outbound(&self, ctx: &ws::WebsocketContext<Self>) -> Arc<dyn Outbound> {
        Arc::new(WsTransport::new(ctx.address().recipient()))
    }

    fn join_table(&mut self, ctx: &mut ws::WebsocketContext<Self>, table_id: String, player_name: String) {
        let conn = self.outbound(ctx);
        let player_id = self.conn_id.clone();
        let result = shell::run_with(&self.registry, &table_id, move |state| match state.join(
            player_id,
            player_name,
            conn,
        ) {
            Ok((seat, events)) => {
                let summary =
                    Ok((seat, state.game_type, state.options.ending_score, state.player_summaries()));
                (events, summary)
            }
            Err(err) => (Vec::new(), Err(err)),
        });
        match result {
            None => Self::send_error(ctx, ErrorCode::TableNotFound),
            Some(Err(code)) => Self::send_error(ctx, code),
            Some(Ok((seat, game_type, ending_score, players))) => {
                self.location = Some(Location::Seated { table_id: table_id.clone(), seat });
                Self::send_json(
                    ctx,
                    &ServerEvent::TableJoined { table_id, seat, game_type, ending_score, players },
                );
            }
        }
    }

    fn spectate_table(&mut self, ctx: &mut ws::WebsocketContext<Self>, table_id: String, name: String) {
        if !self.registry.contains(&table_id) {
            Self::send_error(ctx, ErrorCode::TableNotFound);
            return;
        }
        let conn = self.outbound(ctx);
        let id = self.conn_id.clone();
        shell::run(&self.registry, &table_id, |state| state.spectate(id, name, conn));
        self.location = Some(Location::Spectating { table_id });
    }

    /// Runs `f` against the table the session currently occupies a seat at.
    /// Replies with `PhaseError` if the session isn't seated anywhere.
    fn with_seat(
        &mut self,
        ctx: &mut ws::WebsocketContext<Self>,
        f: impl FnOnce(&mut crate::table::controller::TableState, u8) -> Vec<crate::table::controller::Outgoing>,
    ) {
        let Some(Location::Seated { table_id, seat }) = &self.location else {
            Self::send_error(ctx, ErrorCode::PhaseError);
            return;
        };
        let table_id = table_id.clone();
        let seat = *seat;
        shell::run(&self.registry, &table_id, |state| f(state, seat));
    }

    fn handle_client_event(&mut self, ctx: &mut ws::WebsocketContext<Self>, event: ClientEvent) {
        match event {
            ClientEvent::ListTables { game_type, include_in_progress } => {
                let filter =
                    ListFilter { game_type, include_in_progress: include_in_progress.unwrap_or(false) };
                let tables = self.registry.list(filter);
                Self::send_json(ctx, &ServerEvent::TablesList { tables });
            }
            ClientEvent::CreateTable { player_name, game_type, options } => {
                if player_name.trim().is_empty() {
                    Self::send_error(ctx, ErrorCode::NameRequired);
                    return;
                }
                let table_id = self.registry.create(game_type, options);
                self.join_table(ctx, table_id, player_name);
            }
            ClientEvent::JoinTable { table_id, player_name } => {
                if player_name.trim().is_empty() {
                    Self::send_error(ctx, ErrorCode::NameRequired);
                    return;
                }
                if !self.registry.contains(&table_id) {
                    Self::send_error(ctx, ErrorCode::TableNotFound);
                    return;
                }
                self.join_table(ctx, table_id, player_name);
            }
            ClientEvent::LeaveTable {} => {
                if let Some(Location::Seated { table_id, .. }) = self.location.take() {
                    let id = self.conn_id.clone();
                    shell::run(&self.registry, &table_id, |state| state.leave(&id));
                }
            }
            ClientEvent::SpectateTable { table_id, player_name } => {
                let name = player_name.unwrap_or_else(|| "Spectator".to_string());
                self.spectate_table(ctx, table_id, name);
            }
            ClientEvent::LeaveSpectate {} => {
                if let Some(Location::Spectating { table_id }) = self.location.take() {
                    let id = self.conn_id.clone();
                    shell::run(&self.registry, &table_id, |state| {
                        state.leave_spectate(&id);
                        Vec::new()
                    });
                }
            }
            ClientEvent::SubmitPass { cards } => {
                self.with_seat(ctx, |state, seat| state.submit_pass(seat, cards));
            }
            ClientEvent::SelectContract { contract_type, contract_name, trump_suit } => {
                self.with_seat(ctx, |state, seat| {
                    state.select_contract(seat, contract_type, contract_name, trump_suit)
                });
            }
            ClientEvent::SubmitBid { bid } => {
                self.with_seat(ctx, |state, seat| state.submit_bid(seat, bid));
            }
            ClientEvent::PlayCard { card } => {
                self.with_seat(ctx, |state, seat| state.play_card(seat, card));
            }
            ClientEvent::Rematch { vote } => {
                self.with_seat(ctx, |state, seat| state.submit_rematch_vote(seat, vote));
            }
            ClientEvent::ChatMessage { text } => {
                self.with_seat(ctx, |state, seat| {
                    let name = state
                        .player_summaries()
                        .into_iter()
                        .find(|p| p.seat == seat)
                        .map(|p| p.name)
                        .unwrap_or_default();
                    state.chat(seat, &name, &text)
                });
            }
            ClientEvent::Typing { is_typing } => {
                if let Some(Location::Seated { table_id, seat }) = &self.location {
                    let table_id = table_id.clone();
                    let seat = *seat;
                    shell::typing(&self.registry, &table_id, seat, is_typing);
                }
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        match self.location.take() {
            Some(Location::Seated { table_id, .. }) => {
                let id = self.conn_id.clone();
                shell::run(&self.registry, &table_id, |state| state.leave(&id));
            }
            Some(Location::Spectating { table_id }) => {
                let id = self.conn_id.clone();
                shell::run(&self.registry, &table_id, |state| {
                    state.leave_spectate(&id);
                    Vec::new()
                });
            }
            None => {}
        }
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => self.handle_client_event(ctx, event),
                    Err(err) => {
                        warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] malformed event");
                        Self::send_error(ctx, ErrorCode::MalformedEvent);
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, ErrorCode::MalformedEvent);
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<OutboundMessage> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: OutboundMessage, ctx: &mut Self::Context) -> Self::Result {
        Self::send_json(ctx, &msg.0);
    }
}
