//! Runtime configuration for the Bastion server.

use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP + WS server binds to.
    pub server_addr: String,
    /// Bound of each session's command inbox.
    pub session_channel_capacity: usize,
    /// Seconds a session with nobody connected stays alive.
    pub session_idle_grace: u64,
    /// Upper bound on concurrently running games.
    pub max_sessions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server_addr: "127.0.0.1:8080".into(),
            session_channel_capacity: 64,
            session_idle_grace: 120, // 2 min
            max_sessions: 256,
        }
    }
}

impl Settings {
    fn from_env() -> Self {
        let defaults = Settings::default();
        Settings {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            session_channel_capacity: parse_var(
                "SESSION_CHANNEL_CAPACITY",
                defaults.session_channel_capacity,
            ),
            session_idle_grace: parse_var("SESSION_IDLE_GRACE", defaults.session_idle_grace),
            max_sessions: parse_var("MAX_SESSIONS", defaults.max_sessions),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.parse::<T>().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable {key}={v:?}");
            default
        }),
        Err(_) => default,
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
