use std::env;
use std::fmt;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub supabase: SupabaseConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Connection parameters for the hosted auth + REST endpoints
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub service_role_key: String,
    /// When set, caller tokens are checked locally before the auth API lookup
    pub jwt_secret: Option<String>,
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("service_role_key", &"<redacted>")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgREST under `{SUPABASE_URL}/rest/v1`
    Rest,
    /// Direct Postgres connection
    Postgres { database_url: String },
}

impl fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Rest => f.write_str("Rest"),
            StoreBackend::Postgres { .. } => f.write_str("Postgres { database_url: <redacted> }"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub max_connections: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid URL in {var}: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("{0} must use https in this environment")]
    InsecureUrl(&'static str),

    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },

    #[error("Unknown DATA_STORE backend '{0}' (expected 'rest' or 'postgres')")]
    UnknownBackend(String),
}

struct Preset {
    require_https: bool,
    max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let mut preset = Self::preset(environment);
        if let Some(v) = get("SECURITY_REQUIRE_HTTPS") {
            preset.require_https = v.parse().map_err(|_| ConfigError::InvalidValue {
                var: "SECURITY_REQUIRE_HTTPS",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            preset.max_connections = v
                .parse()
                .ok()
                .filter(|n: &u32| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: "DATABASE_MAX_CONNECTIONS",
                    value: v.clone(),
                })?;
        }

        let raw_url = get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
            var: "SUPABASE_URL",
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                var: "SUPABASE_URL",
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        if preset.require_https && url.scheme() != "https" {
            return Err(ConfigError::InsecureUrl("SUPABASE_URL"));
        }

        let service_role_key =
            get("SUPABASE_SERVICE_ROLE_KEY").ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        let backend = match get("DATA_STORE").as_deref() {
            None | Some("rest") => StoreBackend::Rest,
            Some("postgres") => StoreBackend::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            environment,
            supabase: SupabaseConfig {
                url,
                service_role_key,
                jwt_secret: get("SUPABASE_JWT_SECRET"),
            },
            store: StoreConfig {
                backend,
                max_connections: preset.max_connections,
            },
        })
    }

    fn preset(environment: Environment) -> Preset {
        match environment {
            Environment::Development => Preset {
                require_https: false,
                max_connections: 5,
            },
            Environment::Staging => Preset {
                require_https: true,
                max_connections: 10,
            },
            Environment::Production => Preset {
                require_https: true,
                max_connections: 20,
            },
        }
    }
}
