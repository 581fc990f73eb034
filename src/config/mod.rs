use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

const DEV_IDENTITY_SECRET: &str = "dev-identity-secret-change-me";
const DEV_WORKSPACE_SECRET: &str = "dev-workspace-secret-change-me";
const DEV_SERVER_TOKEN: &str = "dev-server-token-change-me";

/// Upper bound for either token lifetime (one year)
pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub firewall: FirewallConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub storage: StorageBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub identity_secret: String,
    #[serde(skip_serializing)]
    pub workspace_secret: String,
    /// Shared secret expected in `x-server-token` on internal routes
    #[serde(skip_serializing)]
    pub server_token: String,
    pub workspace_token_expiry_hours: u64,
    pub identity_token_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Development secret used outside development: {0}")]
    DevelopmentSecret(&'static str),

    #[error("Invalid configuration: {0} must be between 1 and {max} hours", max = MAX_TOKEN_EXPIRY_HOURS)]
    ExpiryOutOfRange(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("AGENTOVA_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            self.server.storage = v.parse().unwrap_or(self.server.storage);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Firewall overrides
        if let Ok(v) = env::var("FIREWALL_ENABLED") {
            self.firewall.enabled = v.parse().unwrap_or(self.firewall.enabled);
        }
        if let Ok(v) = env::var("FIREWALL_MAX_REQUESTS") {
            self.firewall.max_requests = v.parse().unwrap_or(self.firewall.max_requests);
        }
        if let Ok(v) = env::var("FIREWALL_WINDOW_MS") {
            self.firewall.window_ms = v.parse().unwrap_or(self.firewall.window_ms);
        }

        // Security overrides
        if let Ok(v) = env::var("IDENTITY_JWT_SECRET") {
            self.security.identity_secret = v;
        }
        if let Ok(v) = env::var("JWT_WORKSPACE_SECRET") {
            self.security.workspace_secret = v;
        }
        if let Ok(v) = env::var("SERVER_API_AGENT_TOKEN") {
            self.security.server_token = v;
        }
        if let Ok(v) = env::var("WORKSPACE_TOKEN_EXPIRY_HOURS") {
            self.security.workspace_token_expiry_hours =
                v.parse().unwrap_or(self.security.workspace_token_expiry_hours);
        }
        if let Ok(v) = env::var("IDENTITY_TOKEN_EXPIRY_HOURS") {
            self.security.identity_token_expiry_hours =
                v.parse().unwrap_or(self.security.identity_token_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Reject configurations that would run outside development with
    /// missing or development-only settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.storage == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&self.security.workspace_token_expiry_hours) {
            return Err(ConfigError::ExpiryOutOfRange("WORKSPACE_TOKEN_EXPIRY_HOURS"));
        }
        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&self.security.identity_token_expiry_hours) {
            return Err(ConfigError::ExpiryOutOfRange("IDENTITY_TOKEN_EXPIRY_HOURS"));
        }

        if self.environment == Environment::Development {
            return Ok(());
        }

        if self.security.identity_secret.is_empty() {
            return Err(ConfigError::Missing("IDENTITY_JWT_SECRET"));
        }
        if self.security.workspace_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_WORKSPACE_SECRET"));
        }
        if self.security.server_token.is_empty() {
            return Err(ConfigError::Missing("SERVER_API_AGENT_TOKEN"));
        }
        if self.security.identity_secret == DEV_IDENTITY_SECRET {
            return Err(ConfigError::DevelopmentSecret("IDENTITY_JWT_SECRET"));
        }
        if self.security.workspace_secret == DEV_WORKSPACE_SECRET {
            return Err(ConfigError::DevelopmentSecret("JWT_WORKSPACE_SECRET"));
        }
        if self.security.server_token == DEV_SERVER_TOKEN {
            return Err(ConfigError::DevelopmentSecret("SERVER_API_AGENT_TOKEN"));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                storage: StorageBackend::Memory,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 15,
            },
            firewall: FirewallConfig {
                enabled: true,
                max_requests: 10,
                window_ms: 10_000,
            },
            security: SecurityConfig {
                identity_secret: DEV_IDENTITY_SECRET.to_string(),
                workspace_secret: DEV_WORKSPACE_SECRET.to_string(),
                server_token: DEV_SERVER_TOKEN.to_string(),
                workspace_token_expiry_hours: 24,
                identity_token_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8080,
                storage: StorageBackend::Postgres,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 15,
            },
            firewall: FirewallConfig {
                enabled: true,
                max_requests: 10,
                window_ms: 10_000,
            },
            security: SecurityConfig {
                identity_secret: String::new(),
                workspace_secret: String::new(),
                server_token: String::new(),
                workspace_token_expiry_hours: 12,
                identity_token_expiry_hours: 24,
                cors_origins: vec![],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                storage: StorageBackend::Postgres,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 15,
            },
            firewall: FirewallConfig {
                enabled: true,
                max_requests: 10,
                window_ms: 10_000,
            },
            security: SecurityConfig {
                identity_secret: String::new(),
                workspace_secret: String::new(),
                server_token: String::new(),
                workspace_token_expiry_hours: 4,
                identity_token_expiry_hours: 4,
                cors_origins: vec![],
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
