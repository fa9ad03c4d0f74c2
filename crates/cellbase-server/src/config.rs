//! Configuration management
//!
//! Values come from the environment (a `.env` file is honoured) and fall
//! back to the `DEFAULT_*` constants below. [`Config`] is built once at
//! startup and passed explicitly to the backend factory and the router.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 9090;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/cellbase";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Hard cap applied to any requested `limit`.
pub const DEFAULT_MAX_LIMIT: u64 = 5000;

/// Number of batch sub-queries in flight at once.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

pub const DEFAULT_SPECIES: &str = "hsapiens";

pub const DEFAULT_ASSEMBLY: &str = "GRCh38";

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub backend: BackendConfig,
    pub query: QueryConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Which document store backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(BackendKind::Postgres),
            "memory" | "in-memory" => Ok(BackendKind::Memory),
            _ => Err(anyhow::anyhow!("Invalid backend kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// JSON collections loaded by the in-memory backend
    pub fixtures_dir: Option<PathBuf>,
}

/// Engine-wide query limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Applied when a query has no limit; `None` means unlimited
    pub default_limit: Option<u64>,
    pub max_limit: u64,
    pub batch_concurrency: usize,
    pub default_species: String,
    pub default_assembly: String,
}

impl QueryConfig {
    /// Effective limit for a request
    pub fn effective_limit(&self, requested: Option<u64>) -> Option<u64> {
        requested
            .or(self.default_limit)
            .map(|limit| limit.min(self.max_limit))
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: None,
            max_limit: DEFAULT_MAX_LIMIT,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            default_species: DEFAULT_SPECIES.to_string(),
            default_assembly: DEFAULT_ASSEMBLY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Parse an environment variable, falling back on absence or parse failure
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_kind = match std::env::var("CELLBASE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => BackendKind::default(),
        };

        let config = Config {
            server: ServerConfig {
                host: env_string("CELLBASE_HOST", DEFAULT_SERVER_HOST),
                port: env_or("CELLBASE_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or("CELLBASE_SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: env_string("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: env_or("DATABASE_MIN_CONNECTIONS", DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                idle_timeout_secs: env_or("DATABASE_IDLE_TIMEOUT", DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            backend: BackendConfig {
                kind: backend_kind,
                fixtures_dir: std::env::var("CELLBASE_FIXTURES_DIR").ok().map(PathBuf::from),
            },
            query: QueryConfig {
                default_limit: std::env::var("CELLBASE_DEFAULT_LIMIT")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .filter(|l| *l > 0),
                max_limit: env_or("CELLBASE_MAX_LIMIT", DEFAULT_MAX_LIMIT),
                batch_concurrency: env_or("CELLBASE_BATCH_CONCURRENCY", DEFAULT_BATCH_CONCURRENCY),
                default_species: env_string("CELLBASE_DEFAULT_SPECIES", DEFAULT_SPECIES),
                default_assembly: env_string("CELLBASE_DEFAULT_ASSEMBLY", DEFAULT_ASSEMBLY),
            },
            cors: CorsConfig {
                allowed_origins: env_string("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ALLOWED_ORIGIN)
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.backend.kind == BackendKind::Postgres {
            if self.database.url.is_empty() {
                anyhow::bail!("Database URL cannot be empty");
            }
            if self.database.max_connections == 0 {
                anyhow::bail!("Database max_connections must be greater than 0");
            }
            if self.database.min_connections > self.database.max_connections {
                anyhow::bail!(
                    "Database min_connections ({}) cannot be greater than max_connections ({})",
                    self.database.min_connections,
                    self.database.max_connections
                );
            }
        }

        if self.query.max_limit == 0 {
            anyhow::bail!("Query max_limit must be greater than 0");
        }

        if self.query.batch_concurrency == 0 {
            anyhow::bail!("Batch concurrency must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            backend: BackendConfig {
                kind: BackendKind::Postgres,
                fixtures_dir: None,
            },
            query: QueryConfig::default(),
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
        }
    }
}
