use std::sync::Arc;

use actix_web::{web, App, HttpServer};

use trickroom::config::Config;
use trickroom::middleware::cors::cors_middleware;
use trickroom::middleware::security_headers::SecurityHeaders;
use trickroom::middleware::structured_logger::StructuredLogger;
use trickroom::table::registry::Registry;
use trickroom::telemetry;
use trickroom::ws::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env();
    tracing::info!(port = config.port, "starting trickroom table service");

    let registry = Arc::new(Registry::new());

    let sweep_registry = registry.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            sweep_registry.sweep();
        }
    });

    let bind_port = config.port;
    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&config))
            .wrap(SecurityHeaders)
            .wrap(StructuredLogger)
            .app_data(web::Data::new(registry.clone()))
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", bind_port))?
    .run()
    .await
}
