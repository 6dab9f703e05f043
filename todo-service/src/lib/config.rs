use std::env;
use std::fmt;
use std::str::FromStr;

use auth::Algorithm;
use auth::JwtError;
use auth::JwtHandler;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

/// Flat environment variables accepted on top of the `SECTION__KEY` form.
const LEGACY_OVERRIDES: [(&str, &str); 6] = [
    ("SECRET_KEY", "jwt.secret"),
    ("ACCESS_TOKEN_EXPIRE_MINUTES", "jwt.expiration_minutes"),
    ("DB_USERNAME", "database.username"),
    ("DB_PASSWORD", "database.password"),
    ("DB_HOST", "database.host"),
    ("DB_NAME", "database.name"),
];

/// Upper bound on the token lifetime: one year.
pub const MAX_EXPIRATION_MINUTES: i64 = 60 * 24 * 365;

/// Process-wide configuration, built once at startup and never mutated.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_database_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Connection options built from discrete fields, so the password needs
    /// no URL escaping.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.name)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

impl JwtConfig {
    pub fn algorithm(&self) -> Result<Algorithm, JwtError> {
        Algorithm::from_str(&self.algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(self.algorithm.clone()))
    }

    /// Token lifetime, bounded to `1..=MAX_EXPIRATION_MINUTES`.
    pub fn expiration(&self) -> Result<Duration, ConfigError> {
        let out_of_range = || {
            ConfigError::Message(format!(
                "jwt.expiration_minutes must be between 1 and {}, got {}",
                MAX_EXPIRATION_MINUTES, self.expiration_minutes
            ))
        };

        if !(1..=MAX_EXPIRATION_MINUTES).contains(&self.expiration_minutes) {
            return Err(out_of_range());
        }
        Duration::try_minutes(self.expiration_minutes).ok_or_else(out_of_range)
    }

    /// Token handler signing with this secret, algorithm and default lifetime.
    pub fn handler(&self) -> Result<JwtHandler, ConfigError> {
        let invalid_algorithm = |e: JwtError| ConfigError::Message(format!("jwt.algorithm: {}", e));

        Ok(JwtHandler::new(self.secret.as_bytes())
            .with_algorithm(self.algorithm().map_err(invalid_algorithm)?)
            .map_err(invalid_algorithm)?
            .with_default_lifetime(self.expiration()?))
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("algorithm", &self.algorithm)
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_database_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    5
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_expiration_minutes() -> i64 {
    auth::jwt::DEFAULT_TOKEN_LIFETIME_MINUTES
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Flat variables (SECRET_KEY, DB_USERNAME, DB_PASSWORD, DB_HOST, DB_NAME,
    ///    ACCESS_TOKEN_EXPIRE_MINUTES)
    /// 2. Sectioned variables (JWT__SECRET, DATABASE__HOST, SERVER__HTTP_PORT, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    ///
    /// A missing signing secret or database credential is an error; the
    /// service must not start without them.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::default().separator("__"));

        for (variable, key) in LEGACY_OVERRIDES {
            builder = builder.set_override_option(key, env::var(variable).ok())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }

        self.jwt.handler()?;

        let credentials = [
            ("database.host", &self.database.host),
            ("database.username", &self.database.username),
            ("database.password", &self.database.password),
            ("database.name", &self.database.name),
        ];
        for (key, value) in credentials {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("{} must not be empty", key)));
            }
        }

        Ok(())
    }
}
