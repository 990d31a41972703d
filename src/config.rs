//! Layered configuration: built-in defaults, then `config.toml`, then the environment.
//!
//! Database settings come from `DB_*` variables (`DB_HOST`, `DB_USER`, `DB_PASSWORD`,
//! `DB_NAME`, `DB_PORT`, `DB_MAX_CONNECTIONS`, `DB_ACQUIRE_TIMEOUT_SECS`). Server settings
//! come from `LEDGERBOARD_*` variables; `LEDGERBOARD_INIT_SCHEMA` is routed to the
//! database section.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// Mounts the `/api/seed/*` development data generators.
    pub enable_seed_routes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            enable_seed_routes: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Apply the bundled DDL at startup.
    pub init_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: "ledgerboard".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            init_schema: false,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs.max(1))
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("DB_").map(|key| {
                format!("database.{}", key.as_str().to_ascii_lowercase()).into()
            }))
            .merge(Env::prefixed("LEDGERBOARD_").map(|key| {
                let key = key.as_str().to_ascii_lowercase();
                match key.as_str() {
                    "init_schema" => "database.init_schema".into(),
                    _ => format!("server.{key}").into(),
                }
            }))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load()?;
            assert_eq!(cfg.database.port, 3306);
            assert_eq!(cfg.database.max_connections, 10);
            assert_eq!(cfg.server.listen_addr, "0.0.0.0:8000");
            assert!(!cfg.server.enable_seed_routes);
            Ok(())
        });
    }

    #[test]
    fn db_env_vars_override_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [database]
                host = "toml-host"
                name = "toml_db"

                [server]
                loglevel = "debug"
                "#,
            )?;
            jail.set_env("DB_HOST", "db.internal");
            jail.set_env("DB_PORT", "3307");
            jail.set_env("DB_USER", "analyst");

            let cfg = Config::load()?;
            assert_eq!(cfg.database.host, "db.internal");
            assert_eq!(cfg.database.port, 3307);
            assert_eq!(cfg.database.user, "analyst");
            assert_eq!(cfg.database.name, "toml_db");
            assert_eq!(cfg.server.loglevel, "debug");
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_vars_reach_server_and_schema_flag() {
        Jail::expect_with(|jail| {
            jail.set_env("LEDGERBOARD_LISTEN_ADDR", "127.0.0.1:9000");
            jail.set_env("LEDGERBOARD_ENABLE_SEED_ROUTES", "true");
            jail.set_env("LEDGERBOARD_INIT_SCHEMA", "true");

            let cfg = Config::load()?;
            assert_eq!(cfg.server.listen_addr, "127.0.0.1:9000");
            assert!(cfg.server.enable_seed_routes);
            assert!(cfg.database.init_schema);
            Ok(())
        });
    }
}
