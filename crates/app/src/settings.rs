//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overridden by `FAIRWAY__*` environment
//! variables (`FAIRWAY__SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Default, Deserialize)]
pub struct Booking {
    /// Default guest fee in cents.
    pub guest_fee_minor: Option<i64>,
}

/// Where booking confirmations and membership inquiries are posted.
#[derive(Debug, Deserialize)]
pub struct Notifier {
    pub webhook_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub booking: Booking,
    pub notifier: Option<Notifier>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("FAIRWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
