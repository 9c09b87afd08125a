//! Configuration for the chat-management service, loaded the way the
//! teacher's `auth-service/src/config/mod.rs` loads `AuthConfig`:
//! environment variables through a `get_env` helper with per-field
//! defaults outside production and required-in-production enforcement.

use crate::domain::{Limits, SecretBytes};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatManagementConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub sms: SmsConfig,
    #[serde(skip)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// PKCS#1 PEM of the active RSA signing key. Absent in dev, where an
    /// ephemeral in-process key is generated at startup instead.
    pub private_key_path: Option<String>,
    pub kid: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_lifetime_seconds: u64,
    pub refresh_token_lifetime_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub otp_validity_seconds: u64,
    pub otp_request_limit_per_phone: u32,
    pub otp_request_window_per_phone_seconds: u64,
    pub otp_request_limit_per_ip: u32,
    pub otp_request_window_per_ip_seconds: u64,
    pub otp_verify_limit: u32,
    pub otp_verify_window_seconds: u64,
    pub max_otp_verify_attempts: u32,
    pub lockout_ttl_seconds: u64,
    pub max_sessions_per_user: usize,
}

impl RateLimitConfig {
    pub fn to_limits(&self, jwt: &JwtConfig) -> Limits {
        Limits {
            otp_validity: Duration::from_secs(self.otp_validity_seconds),
            otp_request_limit_per_phone: self.otp_request_limit_per_phone,
            otp_request_window_per_phone: Duration::from_secs(
                self.otp_request_window_per_phone_seconds,
            ),
            otp_request_limit_per_ip: self.otp_request_limit_per_ip,
            otp_request_window_per_ip: Duration::from_secs(
                self.otp_request_window_per_ip_seconds,
            ),
            otp_verify_limit: self.otp_verify_limit,
            otp_verify_window: Duration::from_secs(self.otp_verify_window_seconds),
            max_otp_verify_attempts: self.max_otp_verify_attempts,
            lockout_ttl: Duration::from_secs(self.lockout_ttl_seconds),
            access_token_lifetime: Duration::from_secs(jwt.access_token_lifetime_seconds),
            refresh_token_lifetime: Duration::from_secs(jwt.refresh_token_lifetime_seconds),
            max_sessions_per_user: self.max_sessions_per_user,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    pub provider: SmsProviderKind,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SmsProviderKind {
    /// Local-dev/test shim: logs the dispatch instead of sending.
    LogOnly,
    /// Placeholder for a real vendor integration (out of scope per spec.md
    /// Sec.1 - only the `SmsProvider` interface is specified here).
    Vendor,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Process-wide HMAC pepper (spec.md Sec.3/4.3). Never persisted,
    /// never logged - see `SecretBytes`.
    pub pepper: SecretBytes,
    pub allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            pepper: SecretBytes::new(vec![0u8; 32]),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl ChatManagementConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;
        let is_prod = environment == Environment::Prod;

        let jwt = JwtConfig {
            private_key_path: env::var("JWT_PRIVATE_KEY_PATH").ok(),
            kid: get_env("JWT_KID", Some("kid-1"), is_prod)?,
            issuer: get_env("JWT_ISSUER", Some("chat-management"), is_prod)?,
            audience: get_env("JWT_AUDIENCE", Some("chat-clients"), is_prod)?,
            access_token_lifetime_seconds: parse_u64(
                "JWT_ACCESS_TOKEN_LIFETIME_SECONDS",
                3600,
                is_prod,
            )?,
            refresh_token_lifetime_seconds: parse_u64(
                "JWT_REFRESH_TOKEN_LIFETIME_SECONDS",
                30 * 24 * 60 * 60,
                is_prod,
            )?,
        };

        if is_prod && jwt.private_key_path.is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_PRIVATE_KEY_PATH is required in production but not set"
            )));
        }

        let pepper_hex = get_env("OTP_PEPPER", if is_prod { None } else { Some("") }, is_prod)?;
        let pepper = if pepper_hex.is_empty() {
            SecretBytes::new(vec![0u8; 32])
        } else {
            SecretBytes::new(
                hex::decode(&pepper_hex)
                    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?,
            )
        };

        let config = ChatManagementConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("chat-management"), is_prod)?,
            service_version: get_env(
                "SERVICE_VERSION",
                Some(env!("CARGO_PKG_VERSION")),
                is_prod,
            )?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            database: DatabaseConfig {
                url: get_env(
                    "DATABASE_URL",
                    Some("postgres://localhost/chat_management"),
                    is_prod,
                )?,
                max_connections: parse_u32("DATABASE_MAX_CONNECTIONS", 10, is_prod)?,
                min_connections: parse_u32("DATABASE_MIN_CONNECTIONS", 1, is_prod)?,
            },
            redis: RedisConfig {
                url: get_env("REDIS_URL", Some("redis://localhost:6379"), is_prod)?,
            },
            jwt,
            rate_limit: RateLimitConfig {
                otp_validity_seconds: parse_u64("OTP_VALIDITY_SECONDS", 5 * 60, is_prod)?,
                otp_request_limit_per_phone: parse_u32(
                    "OTP_REQUEST_LIMIT_PER_PHONE",
                    3,
                    is_prod,
                )?,
                otp_request_window_per_phone_seconds: parse_u64(
                    "OTP_REQUEST_WINDOW_PER_PHONE_SECONDS",
                    15 * 60,
                    is_prod,
                )?,
                otp_request_limit_per_ip: parse_u32("OTP_REQUEST_LIMIT_PER_IP", 10, is_prod)?,
                otp_request_window_per_ip_seconds: parse_u64(
                    "OTP_REQUEST_WINDOW_PER_IP_SECONDS",
                    15 * 60,
                    is_prod,
                )?,
                otp_verify_limit: parse_u32("OTP_VERIFY_LIMIT", 5, is_prod)?,
                otp_verify_window_seconds: parse_u64(
                    "OTP_VERIFY_WINDOW_SECONDS",
                    15 * 60,
                    is_prod,
                )?,
                max_otp_verify_attempts: parse_u32("MAX_OTP_VERIFY_ATTEMPTS", 5, is_prod)?,
                lockout_ttl_seconds: parse_u64("LOCKOUT_TTL_SECONDS", 15 * 60, is_prod)?,
                max_sessions_per_user: parse_u32("MAX_SESSIONS_PER_USER", 5, is_prod)? as usize,
            },
            sms: SmsConfig {
                provider: get_env("SMS_PROVIDER", Some("logonly"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
            security: SecurityConfig {
                pepper,
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Config fixture for tests that need an `AppState` but not the
    /// environment-variable plumbing of [`Self::from_env`].
    pub fn for_test() -> Self {
        Self {
            common: core_config::Config { port: 0 },
            environment: Environment::Dev,
            service_name: "chat-management-test".to_string(),
            service_version: "test".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: "postgres://localhost/chat_management_test".to_string(),
                max_connections: 1,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
            },
            jwt: JwtConfig {
                private_key_path: None,
                kid: "kid-test".to_string(),
                issuer: "chat-management-test".to_string(),
                audience: "chat-clients-test".to_string(),
                access_token_lifetime_seconds: 3600,
                refresh_token_lifetime_seconds: 30 * 24 * 60 * 60,
            },
            rate_limit: RateLimitConfig {
                otp_validity_seconds: 5 * 60,
                otp_request_limit_per_phone: 3,
                otp_request_window_per_phone_seconds: 15 * 60,
                otp_request_limit_per_ip: 10,
                otp_request_window_per_ip_seconds: 15 * 60,
                otp_verify_limit: 5,
                otp_verify_window_seconds: 15 * 60,
                max_otp_verify_attempts: 5,
                lockout_ttl_seconds: 15 * 60,
                max_sessions_per_user: 5,
            },
            sms: SmsConfig {
                provider: SmsProviderKind::LogOnly,
            },
            security: SecurityConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }
        if self.jwt.access_token_lifetime_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_ACCESS_TOKEN_LIFETIME_SECONDS must be positive"
            )));
        }
        if self.rate_limit.max_sessions_per_user == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "MAX_SESSIONS_PER_USER must be positive"
            )));
        }
        if self.environment == Environment::Prod
            && self.security.allowed_origins.iter().any(|o| o == "*")
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Wildcard CORS origin not allowed in production"
            )));
        }
        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_u64(key: &str, default: u64, is_prod: bool) -> Result<u64, AppError> {
    get_env(key, Some(&default.to_string()), is_prod)?
        .parse()
        .map_err(|e: std::num::ParseIntError| AppError::ConfigError(anyhow::anyhow!(e.to_string())))
}

fn parse_u32(key: &str, default: u32, is_prod: bool) -> Result<u32, AppError> {
    get_env(key, Some(&default.to_string()), is_prod)?
        .parse()
        .map_err(|e: std::num::ParseIntError| AppError::ConfigError(anyhow::anyhow!(e.to_string())))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for SmsProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logonly" | "log_only" | "log" => Ok(SmsProviderKind::LogOnly),
            "vendor" => Ok(SmsProviderKind::Vendor),
            _ => Err(format!("Invalid SMS provider: {}", s)),
        }
    }
}
