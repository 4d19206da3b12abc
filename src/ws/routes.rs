//! HTTP route wiring: the `/ws` upgrade plus `GET /health` and `GET /tables`
//! (SPEC_FULL §B), grounded in the teacher's `routes::health` / `routes::games`
//! configure-style wiring.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::table::registry::ListFilter;
use crate::ws::session;

#[derive(Debug, Deserialize)]
struct TablesQuery {
    #[serde(default)]
    game_type: Option<crate::protocol::events::GameType>,
    #[serde(default)]
    include_in_progress: Option<bool>,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn tables(
    query: web::Query<TablesQuery>,
    registry: web::Data<std::sync::Arc<crate::table::registry::Registry>>,
) -> HttpResponse {
    let filter = ListFilter {
        game_type: query.game_type,
        include_in_progress: query.include_in_progress.unwrap_or(false),
    };
    HttpResponse::Ok().json(registry.list(filter))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/tables", web::get().to(tables))
        .route("/ws", web::get().to(session::upgrade));
}
