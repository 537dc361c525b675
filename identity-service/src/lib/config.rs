use std::env;
use std::fs;
use std::time::Duration;

use auth::SigningScheme;
use auth::TokenLifetimes;
use chrono::TimeDelta;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Token signing and lifetime settings.
///
/// `algorithm` selects the key source: `HS256` reads `secret`, `RS256` reads
/// the inline PEM fields or, when those are absent, the PEM file paths.
#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    pub secret: Option<String>,
    pub private_key_pem: Option<String>,
    pub public_key_pem: Option<String>,
    pub private_key_path: Option<String>,
    pub public_key_path: Option<String>,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    #[serde(default)]
    pub leeway_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl AuthConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_ttl_minutes() -> i64 {
    15
}

fn default_refresh_ttl_days() -> i64 {
    7
}

fn default_operation_timeout_ms() -> u64 {
    5_000
}

impl JwtConfig {
    /// Build the signing scheme shared by access and refresh tokens.
    ///
    /// # Errors
    /// * Unknown algorithm, missing key material, or unreadable PEM file
    pub fn signing_scheme(&self) -> Result<SigningScheme, ConfigError> {
        match self.algorithm.to_ascii_uppercase().as_str() {
            "HS256" => {
                let secret = self.secret.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| {
                    ConfigError::Message("jwt.secret is required for HS256".to_string())
                })?;
                Ok(SigningScheme::hs256(secret))
            }
            "RS256" => {
                let private_key = pem_source(
                    "private",
                    self.private_key_pem.as_deref(),
                    self.private_key_path.as_deref(),
                )?;
                let public_key = pem_source(
                    "public",
                    self.public_key_pem.as_deref(),
                    self.public_key_path.as_deref(),
                )?;
                Ok(SigningScheme::rs256(private_key, public_key))
            }
            other => Err(ConfigError::Message(format!(
                "unsupported jwt.algorithm: {other}"
            ))),
        }
    }

    /// # Errors
    /// * A lifetime is zero, negative or out of range
    pub fn lifetimes(&self) -> Result<TokenLifetimes, ConfigError> {
        if self.access_ttl_minutes <= 0 || self.refresh_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "jwt token lifetimes must be positive".to_string(),
            ));
        }

        let access = TimeDelta::try_minutes(self.access_ttl_minutes).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.access_ttl_minutes out of range: {}",
                self.access_ttl_minutes
            ))
        })?;
        let refresh = TimeDelta::try_days(self.refresh_ttl_days).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.refresh_ttl_days out of range: {}",
                self.refresh_ttl_days
            ))
        })?;

        Ok(TokenLifetimes { access, refresh })
    }
}

fn pem_source(
    which: &str,
    inline: Option<&str>,
    path: Option<&str>,
) -> Result<String, ConfigError> {
    if let Some(pem) = inline.filter(|p| !p.is_empty()) {
        return Ok(pem.to_string());
    }

    match path.filter(|p| !p.is_empty()) {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            ConfigError::Message(format!("failed to read {which} key at {path}: {e}"))
        }),
        None => Err(ConfigError::Message(format!(
            "jwt.{which}_key_pem or jwt.{which}_key_path is required for RS256"
        ))),
    }
}

// Key material stays out of logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__ACCESS_TTL_MINUTES=30 overrides jwt.access_ttl_minutes
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
