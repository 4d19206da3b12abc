#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used, clippy::panic, clippy::todo, clippy::unimplemented))]

pub mod cards;
pub mod config;
pub mod engines;
pub mod error;
pub mod errors;
pub mod middleware;
pub mod protocol;
pub mod table;
pub mod telemetry;
pub mod transport;
pub mod ws;

pub use config::Config;
pub use error::AppError;
pub use errors::ErrorCode;
pub use table::{Registry, TableState};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}
