use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::task::spawn_blocking;

#[derive(Debug, Deserialize, Clone)]
pub struct NetSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub token_secret: String,
    pub token_expiry_hours: i64,
    pub session_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleSettings {
    pub calendar_api_base: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub net: NetSettings,
    pub auth: AuthSettings,
    pub google: GoogleSettings,
}

impl Settings {
    pub async fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("net.host", "0.0.0.0")?
            .set_default("net.port", 5100)?
            .set_default("auth.token_expiry_hours", 24)?
            .set_default("auth.session_ttl_hours", 24)?
            .set_default(
                "google.calendar_api_base",
                "https://www.googleapis.com/calendar/v3",
            )?;

        spawn_blocking(move || {
            builder
                .add_source(File::from(PathBuf::from("config.toml")).required(false))
                .add_source(Environment::with_prefix("GATHER").separator("__"))
                .build()
                .and_then(Config::try_deserialize)
        })
        .await
        .expect("unable to join spawn_blocking thread")
    }
}

#[cfg(test)]
impl Settings {
    pub fn test_defaults() -> Self {
        Self {
            net: NetSettings {
                host: "127.0.0.1".into(),
                port: 0,
            },
            auth: AuthSettings {
                token_secret: "test-secret".into(),
                token_expiry_hours: 24,
                session_ttl_hours: 24,
            },
            google: GoogleSettings {
                calendar_api_base: "https://www.googleapis.com/calendar/v3".into(),
            },
        }
    }
}
