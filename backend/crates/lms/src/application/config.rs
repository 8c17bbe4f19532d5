//! Application Configuration
//!
//! Configuration for the LMS application layer, read from the environment.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use platform::password::HashCost;
use platform::rate_limit::RateLimitConfig;
use thiserror::Error;

/// Signing secret used when none is configured outside production
pub const INSECURE_DEV_SECRET: &str = "insecure-dev-secret-change-me-before-deploying";

/// Default token lifetime
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 3600);

/// Both rate limit windows are 15 minutes
const RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in production")]
    MissingJwtSecret,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl Environment {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            _ => Err(ConfigError::InvalidValue {
                name: "APP_ENV",
                value: raw.to_string(),
            }),
        }
    }

    /// Build-profile default
    pub fn default_for_build() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// LMS application configuration
#[derive(Clone)]
pub struct LmsConfig {
    pub environment: Environment,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    pub token_lifetime: Duration,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Register / login / reset-password
    pub auth_rate_limit: RateLimitConfig,
    /// Everything else under `/api`
    pub api_rate_limit: RateLimitConfig,
    pub hash_cost: HashCost,
    /// Attribute requests to the first X-Forwarded-For entry
    pub trust_proxy: bool,
}

impl Default for LmsConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            jwt_secret: INSECURE_DEV_SECRET.to_string(),
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            cors_origins: vec!["http://localhost:3000".to_string()],
            port: 3000,
            data_dir: PathBuf::from("data"),
            auth_rate_limit: RateLimitConfig::new(5, RATE_LIMIT_WINDOW_SECS).skip_successful(),
            api_rate_limit: RateLimitConfig::new(100, RATE_LIMIT_WINDOW_SECS),
            hash_cost: HashCost::default(),
            trust_proxy: false,
        }
    }
}

impl LmsConfig {
    /// Create config for tests (cheap hashing, throwaway secret)
    pub fn for_tests() -> Self {
        Self {
            environment: Environment::Test,
            jwt_secret: "test-secret".to_string(),
            hash_cost: HashCost::MINIMUM,
            ..Default::default()
        }
    }

    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(raw) => Environment::parse(&raw)?,
            None => Environment::default_for_build(),
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => return Err(ConfigError::MissingJwtSecret),
            None => {
                tracing::warn!("JWT_SECRET not set, using insecure development secret");
                INSECURE_DEV_SECRET.to_string()
            }
        };

        let token_lifetime = match get("JWT_EXPIRES_IN") {
            Some(raw) => parse_duration(&raw).ok_or(ConfigError::InvalidValue {
                name: "JWT_EXPIRES_IN",
                value: raw,
            })?,
            None => DEFAULT_TOKEN_LIFETIME,
        };

        let cors_origins = match get("FRONTEND_URL") {
            Some(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            None => Self::default().cors_origins,
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: raw,
            })?,
            None => 3000,
        };

        let data_dir = get("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));

        let trust_proxy = match get("TRUST_PROXY") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                name: "TRUST_PROXY",
                value: raw,
            })?,
            None => false,
        };

        Ok(Self {
            environment,
            jwt_secret,
            token_lifetime,
            cors_origins,
            port,
            data_dir,
            trust_proxy,
            ..Default::default()
        })
    }

    pub fn uses_insecure_secret(&self) -> bool {
        self.jwt_secret == INSECURE_DEV_SECRET
    }
}

impl fmt::Debug for LmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LmsConfig")
            .field("environment", &self.environment)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_lifetime", &self.token_lifetime)
            .field("cors_origins", &self.cors_origins)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("auth_rate_limit", &self.auth_rate_limit)
            .field("api_rate_limit", &self.api_rate_limit)
            .field("hash_cost", &self.hash_cost)
            .field("trust_proxy", &self.trust_proxy)
            .finish()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse `90`, `90s`, `15m`, `24h` or `7d`
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let value: u64 = digits.parse().ok()?;
    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86_400,
        _ => return None,
    };

    let secs = value.checked_mul(multiplier)?;
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_production_requires_secret() {
        let result = LmsConfig::from_lookup(lookup(&[("APP_ENV", "production")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingJwtSecret);

        let result = LmsConfig::from_lookup(lookup(&[("APP_ENV", "production"), ("JWT_SECRET", "  ")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingJwtSecret);
    }

    #[test]
    fn test_development_falls_back_to_insecure_secret() {
        let config = LmsConfig::from_lookup(lookup(&[("APP_ENV", "development")])).unwrap();
        assert!(config.uses_insecure_secret());
        assert_eq!(config.token_lifetime, DEFAULT_TOKEN_LIFETIME);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_full_environment() {
        let config = LmsConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRES_IN", "2h"),
            ("FRONTEND_URL", "https://a.example, https://b.example"),
            ("PORT", "8080"),
            ("DATA_DIR", "/var/lib/lms"),
        ]))
        .unwrap();

        assert!(config.environment.is_production());
        assert!(!config.uses_insecure_secret());
        assert_eq!(config.token_lifetime, Duration::from_secs(7200));
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/lms"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            LmsConfig::from_lookup(lookup(&[("APP_ENV", "staging")])),
            Err(ConfigError::InvalidValue { name: "APP_ENV", .. })
        ));
        assert!(matches!(
            LmsConfig::from_lookup(lookup(&[("APP_ENV", "test"), ("PORT", "http")])),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
        assert!(matches!(
            LmsConfig::from_lookup(lookup(&[("APP_ENV", "test"), ("JWT_EXPIRES_IN", "1w")])),
            Err(ConfigError::InvalidValue { name: "JWT_EXPIRES_IN", .. })
        ));
    }

    #[test]
    fn test_trust_proxy_is_opt_in() {
        let config = LmsConfig::from_lookup(lookup(&[("APP_ENV", "test")])).unwrap();
        assert!(!config.trust_proxy);

        let config =
            LmsConfig::from_lookup(lookup(&[("APP_ENV", "test"), ("TRUST_PROXY", "true")])).unwrap();
        assert!(config.trust_proxy);

        assert!(matches!(
            LmsConfig::from_lookup(lookup(&[("APP_ENV", "test"), ("TRUST_PROXY", "maybe")])),
            Err(ConfigError::InvalidValue { name: "TRUST_PROXY", .. })
        ));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_duration("24h"), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_duration("7d"), Some(Duration::from_secs(604_800)));
        assert_eq!(parse_duration("0"), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("-5m"), None);
    }

    #[test]
    fn test_rate_limit_defaults() {
        let config = LmsConfig::default();
        assert_eq!(config.auth_rate_limit.max_requests, 5);
        assert!(config.auth_rate_limit.skip_successful_requests);
        assert_eq!(config.api_rate_limit.max_requests, 100);
        assert_eq!(config.api_rate_limit.window, Duration::from_secs(900));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = LmsConfig::for_tests();
        assert!(!format!("{config:?}").contains("test-secret"));
    }
}
