// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Top-level configuration for the device registry server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRegistryConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
}

/// HTTP listener and logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which [`DeviceStore`](crate::store::DeviceStore) implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("Unknown storage backend '{other}'")),
        }
    }
}

/// Database connection settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            name: String::new(),
            user: String::new(),
            password: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

// Hand-written so the password never reaches the logs.
impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("backend", &self.backend)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env_value(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow!("Invalid value for {name} ('{raw}'): {e}"))
        })
        .transpose()
}

impl DeviceRegistryConfig {
    /// Build a configuration from the process environment.
    ///
    /// Reads `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT`,
    /// `DB_BACKEND`, `DB_MAX_CONNECTIONS`, `SERVER_HOST`, `SERVER_PORT` and
    /// `LOG_LEVEL`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = env_value("SERVER_HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_env("SERVER_PORT")? {
            config.server.port = port;
        }
        if let Some(level) = env_value("LOG_LEVEL") {
            config.server.log_level = level;
        }

        let db = &mut config.database;
        if let Some(backend) = parse_env("DB_BACKEND")? {
            db.backend = backend;
        }
        if let Some(name) = env_value("DB_NAME") {
            db.name = name;
        }
        if let Some(user) = env_value("DB_USER") {
            db.user = user;
        }
        if let Some(password) = env_value("DB_PASSWORD") {
            db.password = password;
        }
        if let Some(host) = env_value("DB_HOST") {
            db.host = host;
        }
        if let Some(port) = parse_env("DB_PORT")? {
            db.port = port;
        }
        if let Some(max) = parse_env("DB_MAX_CONNECTIONS")? {
            db.max_connections = max;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Invalid server port: 0"));
        }
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("Server host cannot be empty"));
        }
        let level = self.server.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}' (expected one of: {})",
                self.server.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        self.database.validate()
    }
}

impl DatabaseSettings {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::Memory {
            return Ok(());
        }
        if self.name.trim().is_empty() {
            return Err(anyhow!("Database name is required (database.name or DB_NAME)"));
        }
        if self.user.trim().is_empty() {
            return Err(anyhow!("Database user is required (database.user or DB_USER)"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("Database host cannot be empty"));
        }
        if self.port == 0 {
            return Err(anyhow!("Invalid database port: 0"));
        }
        if self.max_connections == 0 {
            return Err(anyhow!("database.max_connections must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const DB_VARS: [&str; 10] = [
        "DB_NAME",
        "DB_USER",
        "DB_PASSWORD",
        "DB_HOST",
        "DB_PORT",
        "DB_BACKEND",
        "DB_MAX_CONNECTIONS",
        "SERVER_HOST",
        "SERVER_PORT",
        "LOG_LEVEL",
    ];

    fn clear_env() {
        for var in DB_VARS {
            env::remove_var(var);
        }
    }

    fn postgres_config() -> DeviceRegistryConfig {
        let mut config = DeviceRegistryConfig::default();
        config.database.name = "devices".to_string();
        config.database.user = "registry".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = DeviceRegistryConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_postgres_requires_name_and_user() {
        let config = DeviceRegistryConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Database name is required"));

        let mut config = postgres_config();
        config.database.user.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Database user is required"));

        assert!(postgres_config().validate().is_ok());
    }

    #[test]
    fn test_memory_backend_needs_no_credentials() {
        let mut config = DeviceRegistryConfig::default();
        config.database.backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_server_settings() {
        let mut config = postgres_config();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = postgres_config();
        config.server.log_level = "loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_debug_masks_password() {
        let mut settings = DatabaseSettings::default();
        settings.password = "hunter2".to_string();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("postgresql".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert_eq!("Memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_database_variables() {
        clear_env();
        env::set_var("DB_NAME", "devices");
        env::set_var("DB_USER", "registry");
        env::set_var("DB_PASSWORD", "secret");
        env::set_var("DB_HOST", "db.internal");
        env::set_var("DB_PORT", "6543");
        env::set_var("SERVER_PORT", "9090");

        let config = DeviceRegistryConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.database.name, "devices");
        assert_eq!(config.database.user, "registry");
        assert_eq!(config.database.password, "secret");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_non_numeric_port() {
        clear_env();
        env::set_var("DB_PORT", "five");

        let result = DeviceRegistryConfig::from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));
    }
}
