//! Configuration manager for registry.
//!
//! Values come from `config.yaml` first, then from environment variables
//! which take precedence field by field.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PORT: u16 = 8080;
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration errors raised while reading environment overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {name}: {value:?}")]
    InvalidEnvVar { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Listening port.
    pub port: u16,
    #[serde(skip_deserializing)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Postgres,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_CRATE_NAME").to_owned(),
            port: DEFAULT_PORT,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: Postgres::default(),
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postgres {
    /// Hostname for PostgreSQL instance.
    pub host: String,
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Username credential to connect.
    pub username: String,
    /// Password credential to connect.
    pub password: String,
    /// Namespace holding `user` and `address` tables.
    pub schema: String,
    /// Maximum pool connections.
    pub pool_size: u32,
}

impl Default for Postgres {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 5432,
            database: crate::database::DEFAULT_DATABASE_NAME.to_owned(),
            username: crate::database::DEFAULT_CREDENTIALS.to_owned(),
            password: crate::database::DEFAULT_CREDENTIALS.to_owned(),
            schema: crate::database::DEFAULT_SCHEMA.to_owned(),
            pool_size: crate::database::DEFAULT_POOL_SIZE,
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Application version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location, then applies environment overrides.
    pub fn read(self) -> Result<Arc<Self>, ConfigError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let config = match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file) {
                Ok(mut config) => {
                    config.version = VERSION.to_owned();
                    config
                },
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        };

        Ok(Arc::new(config.with_env(|key| std::env::var(key).ok())?))
    }

    /// Override fields using `lookup`, usually backed by the process
    /// environment.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = parse_var(&lookup, "PORT")? {
            self.port = port;
        }

        let pg = &mut self.postgres;
        if let Some(host) = lookup("POSTGRES_HOST") {
            pg.host = host;
        }
        if let Some(port) = parse_var(&lookup, "POSTGRES_PORT")? {
            pg.port = port;
        }
        if let Some(username) = lookup("POSTGRES_USER") {
            pg.username = username;
        }
        if let Some(password) = lookup("POSTGRES_PASSWORD") {
            pg.password = password;
        }
        if let Some(database) = lookup("POSTGRES_DB") {
            pg.database = database;
        }
        if let Some(schema) = lookup("POSTGRES_USER_SCHEMA") {
            pg.schema = schema;
        }
        if let Some(pool_size) = parse_var(&lookup, "POSTGRES_POOL_SIZE")? {
            pg.pool_size = pool_size;
        }

        Ok(self)
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not loaded, using defaults");
        Self::default()
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar { name, value }),
        None => Ok(None),
    }
}
