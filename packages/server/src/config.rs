use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variable naming an alternative config file (without extension).
pub const CONFIG_PATH_ENV: &str = "STREETREVIEW_CONFIG";

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageProbeConfig {
    /// Reject picture URLs that do not currently serve an image.
    pub enabled: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub image_probe: ImageProbeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config/config".into());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://streetreview.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("image_probe.enabled", true)?
            .set_default("image_probe.timeout_secs", 5)?
            .add_source(File::with_name(&path).required(false))
            // Override from environment (e.g., STREETREVIEW__DATABASE__URL)
            .add_source(
                Environment::with_prefix("STREETREVIEW")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
