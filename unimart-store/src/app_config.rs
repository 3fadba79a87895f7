use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub site: SiteConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Public base URL used when formatting listing links in messages.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// WhatsApp contact for promotion requests. Injected here rather than
    /// compiled in; read once at process start.
    pub whatsapp_number: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment overlay, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // E.g. `UNIMART__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("UNIMART").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
