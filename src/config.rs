//! Process configuration (SPEC_FULL §A.3), read once at startup the way the
//! teacher's `config::db` / `middleware::cors` modules read `std::env::var`
//! with documented defaults.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub hearts_ending_score: i32,
    pub spades_win_threshold: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
    Test,
}

impl AppEnv {
    fn from_env() -> Self {
        match env::var("APP_ENV").unwrap_or_default().as_str() {
            "production" => AppEnv::Production,
            "test" => AppEnv::Test,
            _ => AppEnv::Development,
        }
    }
}

/// King's party length is a fixed rule invariant (spec §4.3: `gameNumber <=
/// 20`), not configuration — `KING_PARTY_GAMES` is intentionally not read
/// from the environment; `engines::king::PARTY_GAMES` is the single source
/// of truth.
impl Config {
    pub fn from_env() -> Self {
        let app_env = AppEnv::from_env();
        let port = env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000);
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && *s != "null")
            .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
            .map(|s| s.to_string())
            .collect();
        let hearts_ending_score = env::var("HEARTS_ENDING_SCORE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(if app_env == AppEnv::Test { 20 } else { 50 });
        let spades_win_threshold =
            env::var("SPADES_WIN_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(300);

        Config { port, app_env, cors_allowed_origins, hearts_ending_score, spades_win_threshold }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hearts_ending_score_is_fifty_outside_test_env() {
        let cfg = Config { port: 3000, app_env: AppEnv::Development, cors_allowed_origins: vec![], hearts_ending_score: 50, spades_win_threshold: 300 };
        assert_eq!(cfg.hearts_ending_score, 50);
    }
}
