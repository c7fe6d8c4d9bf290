use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub request_timeout: Duration,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub username: String,
    pub password: Secret<String>,
    pub database_name: String,
    pub port: u16,
    pub ssl_ca_path: Option<PathBuf>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub query_timeout: Duration,
    pub run_migrations: bool,
}

impl Settings {
    /// Reads the settings from the process environment.
    ///
    /// Call `dotenv::dotenv()` first if a `.env` file should be honored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let database = DatabaseSettings {
            host: env.required("DB_HOST")?,
            username: env.required("DB_USERNAME")?,
            password: Secret::new(env.required("DB_PASSWORD")?),
            database_name: env.required("DB_DATABASE")?,
            port: env.parsed("DB_PORT", DEFAULT_DB_PORT)?,
            ssl_ca_path: env.optional("DB_SSL_CA_PATH").map(PathBuf::from),
            max_connections: env.parsed("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            acquire_timeout: Duration::from_secs(
                env.parsed("DB_ACQUIRE_TIMEOUT_SECS", DEFAULT_ACQUIRE_TIMEOUT_SECS)?,
            ),
            query_timeout: Duration::from_millis(
                env.parsed("DB_QUERY_TIMEOUT_MS", DEFAULT_QUERY_TIMEOUT_MS)?,
            ),
            run_migrations: env.parsed("DB_RUN_MIGRATIONS", false)?,
        };

        if database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        Ok(Settings {
            port: env.parsed("PORT", DEFAULT_HTTP_PORT)?,
            request_timeout: Duration::from_secs(
                env.parsed("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            ),
            database,
        })
    }
}

impl DatabaseSettings {
    /// Connection options for the pool. A configured CA file turns on
    /// verified TLS; without one the driver negotiates TLS opportunistically.
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .database(&self.database_name);

        match &self.ssl_ca_path {
            Some(ca_path) => options
                .ssl_mode(PgSslMode::VerifyCa)
                .ssl_root_cert(ca_path),
            None => options.ssl_mode(PgSslMode::Prefer),
        }
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &'static str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(name) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
            None => Ok(default),
        }
    }
}
