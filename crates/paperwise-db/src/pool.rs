//! Connection pool for the signal store and article catalogue.
//!
//! A weekly request issues at most three sequential signal queries plus one
//! article query per ladder rung, so the pool stays small.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use paperwise_core::{Error, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Pool sizing, read from `DB_*` variables at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a query waits for a free connection before failing
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    /// Read `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS`,
    /// `DB_ACQUIRE_TIMEOUT_SECS` and `DB_IDLE_TIMEOUT_SECS` over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let config = Self {
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parsed(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections),
            acquire_timeout: Duration::from_secs(parsed(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )),
            idle_timeout: Duration::from_secs(parsed(
                &lookup,
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout.as_secs(),
            )),
        };
        config.normalized()
    }

    /// At least one connection, and never more idle than maximum.
    fn normalized(mut self) -> Self {
        self.max_connections = self.max_connections.max(1);
        if self.min_connections > self.max_connections {
            warn!(
                subsystem = "db",
                component = "pool",
                min_connections = self.min_connections,
                max_connections = self.max_connections,
                "DB_MIN_CONNECTIONS above maximum, clamping"
            );
            self.min_connections = self.max_connections;
        }
        self
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(subsystem = "db", component = "pool", var = name, value = %raw, "Ignoring unparseable value");
            default
        }),
        None => default,
    }
}

/// Connect a pool and wait for the first connection.
pub async fn create_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database pool ready"
    );
    Ok(pool)
}

/// Wrap a query error, reporting pool state when no connection was free.
///
/// An exhausted pool surfaces to callers as a signal store failure, so the
/// occupancy is logged where it is still known.
pub fn query_error(pool: &PgPool, op: &'static str, err: sqlx::Error) -> Error {
    if matches!(err, sqlx::Error::PoolTimedOut) {
        warn!(
            subsystem = "db",
            component = "pool",
            op,
            pool_size = pool.size(),
            pool_idle = pool.num_idle(),
            "No free database connection"
        );
    }
    Error::Database(err)
}
