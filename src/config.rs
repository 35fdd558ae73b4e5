// src/config.rs

use std::env;

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    /// Durable identity/credential store (students table).
    pub identity_database_url: String,

    /// Local session/results ledger (login log, results, set counters).
    pub ledger_database_url: String,

    /// Directory holding the static question catalog JSON files.
    pub data_dir: String,

    /// Inactivity window after which a session record expires.
    pub session_ttl_secs: u64,

    /// Tab switches tolerated before the client is told to force-submit.
    pub tab_switch_threshold: u32,

    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let identity_database_url = env::var("IDENTITY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://identity.db?mode=rwc".to_string());

        let ledger_database_url = env::var("LEDGER_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quiz_app.db?mode=rwc".to_string());

        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let tab_switch_threshold = env::var("TAB_SWITCH_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            identity_database_url,
            ledger_database_url,
            data_dir,
            session_ttl_secs,
            tab_switch_threshold,
            rust_log,
        }
    }
}
