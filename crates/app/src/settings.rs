//! Application settings, read from an optional `settings.toml` and
//! `ALLWALLETS__*` environment variables (e.g. `ALLWALLETS__SERVER__PORT`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
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

/// Open Exchange Rates access. Without it the rate table is only refreshed by
/// `worker xrates`.
#[derive(Debug, Deserialize)]
pub struct Rates {
    pub app_id: String,
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_refresh_every_secs")]
    pub refresh_every_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_refresh_every_secs() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    pub rates: Option<Rates>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("ALLWALLETS").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply_to_missing_sections() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
        assert!(settings.rates.is_none());
    }

    #[test]
    fn reads_server_and_rates() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = { sqlite = "wallets.db" }

            [rates]
            app_id = "key"
            refresh_every_secs = 600
            "#,
        );

        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "wallets.db"));

        let rates = settings.rates.unwrap();
        assert_eq!(rates.app_id, "key");
        assert_eq!(rates.timeout_secs, 10);
        assert_eq!(rates.refresh_every_secs, 600);
    }

    #[test]
    fn memory_database() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }
}
