use actix_cors::Cors;
use actix_web::http::header;

use crate::config::Config;

/// Restrictive, explicit CORS for the event channel's HTTP upgrade and the
/// ambient `/health` / `/tables` routes. Origins must be configured via
/// `CORS_ALLOWED_ORIGINS`; invalid/empty entries are dropped and a
/// localhost-only fallback applies.
pub fn cors_middleware(config: &Config) -> Cors {
    let effective_origins: Vec<String> = if config.cors_allowed_origins.is_empty() {
        vec!["http://localhost:3000".to_string(), "http://127.0.0.1:3000".to_string()]
    } else {
        config.cors_allowed_origins.clone()
    };

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    for origin in effective_origins {
        cors = cors.allowed_origin(&origin);
    }

    cors
}
