use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

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
    /// Applied to every write transaction via `SET LOCAL statement_timeout`.
    pub statement_timeout_ms: u64,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EconomyConfig {
    /// Vouchers granted to every newly registered account.
    pub initial_vouchers: i32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    /// Usernames promoted to admin at startup, if they exist.
    #[serde(default)]
    pub admin_usernames: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub economy: EconomyConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.statement_timeout_ms", 5000)?
            .set_default("database.max_connections", 50)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("economy.initial_vouchers", 0)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., STUDYHUB__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("STUDYHUB").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
