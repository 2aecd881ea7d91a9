//! Environment-sourced application configuration.
//!
//! Credentials fall back to empty strings rather than failing startup; a
//! missing or malformed target URL only surfaces when a start request
//! arrives.

use std::env;

/// Target web UI URL.
const TARGET_URL_ENV: &str = "FLOOD_LINK";
/// Login credentials.
const USERNAME_ENV: &str = "FLOOD_USER";
const PASSWORD_ENV: &str = "FLOOD_PWD";
/// Option labels the workflow selects per direction.
const UP_LABEL_ENV: &str = "FLOOD_UP_LABEL";
const DOWN_LABEL_ENV: &str = "FLOOD_DOWN_LABEL";
/// Control surface listen port.
const PORT_ENV: &str = "PORT";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UP_LABEL: &str = "Unlimited";
const DEFAULT_DOWN_LABEL: &str = "10MB";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub listen_port: u16,
    pub target_url: Option<String>,
    pub username: String,
    pub password: String,
    pub up_label: String,
    pub down_label: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            listen_port: resolve_port(),
            target_url: non_empty(TARGET_URL_ENV),
            username: non_empty(USERNAME_ENV).unwrap_or_default(),
            password: non_empty(PASSWORD_ENV).unwrap_or_default(),
            up_label: non_empty(UP_LABEL_ENV).unwrap_or_else(|| DEFAULT_UP_LABEL.to_string()),
            down_label: non_empty(DOWN_LABEL_ENV).unwrap_or_else(|| DEFAULT_DOWN_LABEL.to_string()),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Err(_) => None,
    }
}

fn resolve_port() -> u16 {
    non_empty(PORT_ENV)
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
