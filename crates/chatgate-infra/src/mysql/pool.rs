//! MySQL connection pool with explicit checkout gating.
//!
//! The driver pool (`sqlx::MySqlPool`) owns the physical connections. In
//! front of it sits a [`CheckoutGate`] that enforces the configured
//! wait-for-connections and queue-limit behaviour: a semaphore sized to the
//! connection limit plus a counter of callers currently waiting.
//!
//! When host or user are missing, [`DatabasePool::connect`] returns `Ok(None)`
//! and every database-dependent operation reports itself as unavailable.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::mysql::{
    MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions,
    MySqlQueryResult, MySqlRow,
};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_CONNECTION_LIMIT: u32 = 10;
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the pool itself, as opposed to the queries it runs.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to connect to MySQL: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("no connection available and waiting is disabled")]
    Exhausted,

    #[error("connection queue limit of {0} reached")]
    QueueFull(usize),

    #[error("connection pool is closed")]
    Closed,

    #[error("timed out after {0:?} draining the connection pool")]
    DrainTimeout(Duration),

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Connection settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub database: Option<String>,
    /// Maximum pooled connections (at least 1).
    pub connection_limit: u32,
    /// Maximum callers waiting for a connection; 0 means unbounded.
    pub queue_limit: usize,
    /// When false, an exhausted pool fails immediately instead of queueing.
    pub wait_for_connections: bool,
    pub charset: Option<String>,
    /// Session time zone as `Z` or `+HH:MM`. Naive timestamps read back
    /// are interpreted in this offset.
    pub timezone: Option<String>,
    /// Skip the `SELECT 1` probe when the pool is created.
    pub skip_initial_query: bool,
    /// Deadline for draining connections on shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            user: None,
            password: None,
            database: None,
            connection_limit: DEFAULT_CONNECTION_LIMIT,
            queue_limit: 0,
            wait_for_connections: true,
            charset: None,
            timezone: None,
            skip_initial_query: false,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl DatabaseConfig {
    /// Host and user are both present.
    pub fn is_configured(&self) -> bool {
        non_empty(&self.host).is_some() && non_empty(&self.user).is_some()
    }

    /// Offset the server renders timestamps in. UTC unless `timezone`
    /// parses as an offset.
    pub fn utc_offset(&self) -> FixedOffset {
        self.timezone
            .as_deref()
            .and_then(parse_utc_offset)
            .unwrap_or_else(|| Utc.fix())
    }

    fn connect_options(&self, host: &str, user: &str) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(host)
            .port(self.port)
            .username(user);

        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        if let Some(charset) = &self.charset {
            options = options.charset(charset);
        }
        // Session zone and decode offset must agree.
        options.timezone(Some(self.utc_offset().to_string()))
    }
}

/// Parse `Z` or `+HH:MM` / `-HH:MM`. Anything else (including `local`) is
/// `None`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") {
        return Some(Utc.fix());
    }

    let (sign, rest) = match value.chars().next()? {
        '+' => (1, &value[1..]),
        '-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A positional query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    Null,
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<Option<String>> for SqlParam {
    fn from(v: Option<String>) -> Self {
        v.map_or(SqlParam::Null, SqlParam::Text)
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlParam],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
            SqlParam::Null => query.bind(None::<&str>),
        };
    }
    query
}

/// Admission control in front of the driver pool.
///
/// The only state shared between concurrent requests: permits for checked
/// out connections and the number of callers waiting for one.
#[derive(Debug)]
pub struct CheckoutGate {
    permits: Arc<Semaphore>,
    waiting: AtomicUsize,
    queue_limit: usize,
    wait_for_connections: bool,
}

impl CheckoutGate {
    pub fn new(connection_limit: u32, queue_limit: usize, wait_for_connections: bool) -> Self {
        let size = usize::try_from(connection_limit.max(1)).unwrap_or(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            waiting: AtomicUsize::new(0),
            queue_limit,
            wait_for_connections,
        }
    }

    /// Take a checkout slot, waiting in line when the pool is busy.
    pub async fn enter(&self) -> Result<OwnedSemaphorePermit, PoolError> {
        match self.permits.clone().try_acquire_owned() {
            Ok(permit) => return Ok(permit),
            Err(TryAcquireError::Closed) => return Err(PoolError::Closed),
            Err(TryAcquireError::NoPermits) => {}
        }

        if !self.wait_for_connections {
            return Err(PoolError::Exhausted);
        }

        let position = self.waiting.fetch_add(1, Ordering::SeqCst) + 1;
        let _waiter = WaiterSlot(&self.waiting);
        if self.queue_limit > 0 && position > self.queue_limit {
            return Err(PoolError::QueueFull(self.queue_limit));
        }

        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)
    }

    /// Number of callers currently waiting.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Reject all current and future waiters.
    pub fn close(&self) {
        self.permits.close();
    }
}

/// Releases a waiter's queue slot on drop, including when the waiting
/// future is cancelled.
struct WaiterSlot<'a>(&'a AtomicUsize);

impl Drop for WaiterSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A checked-out connection; returned to the pool on drop.
pub struct PooledConnection {
    conn: PoolConnection<MySql>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = MySqlConnection;

    fn deref(&self) -> &MySqlConnection {
        &self.conn
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }
}

/// The process-wide pool: created once at startup, closed once at shutdown.
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
    gate: Arc<CheckoutGate>,
    database: Option<String>,
    utc_offset: FixedOffset,
    shutdown_timeout: Duration,
}

impl DatabasePool {
    /// Create the pool, or `Ok(None)` when host or user is not configured.
    ///
    /// Unless `skip_initial_query` is set, runs `SELECT 1` so that bad
    /// credentials fail startup instead of the first request.
    pub async fn connect(config: &DatabaseConfig) -> Result<Option<Self>, PoolError> {
        let (Some(host), Some(user)) = (non_empty(&config.host), non_empty(&config.user)) else {
            tracing::warn!("MySQL pool skipped: host and user must be configured");
            return Ok(None);
        };

        if let Some(timezone) = config.timezone.as_deref() {
            if parse_utc_offset(timezone).is_none() {
                tracing::warn!(timezone, "Unrecognised MYSQL_TIMEZONE; using UTC");
            }
        }

        let limit = config.connection_limit.max(1);
        let pool = MySqlPoolOptions::new()
            .max_connections(limit)
            .connect_lazy_with(config.connect_options(host, user));

        if !config.skip_initial_query {
            sqlx::query("SELECT 1").execute(&pool).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to initialize MySQL pool");
                PoolError::Connect(e)
            })?;
        }

        tracing::info!(
            host,
            database = config.database.as_deref().unwrap_or(""),
            connection_limit = limit,
            queue_limit = config.queue_limit,
            "MySQL pool initialized"
        );

        Ok(Some(Self {
            pool,
            gate: Arc::new(CheckoutGate::new(
                limit,
                config.queue_limit,
                config.wait_for_connections,
            )),
            database: config.database.clone().filter(|d| !d.is_empty()),
            utc_offset: config.utc_offset(),
            shutdown_timeout: config.shutdown_timeout,
        }))
    }

    /// Database (schema) name the pool was configured with.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Offset that naive timestamps from this pool are expressed in.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn gate(&self) -> &CheckoutGate {
        &self.gate
    }

    /// Check out a single connection for multi-statement work.
    pub async fn acquire(&self) -> Result<PooledConnection, PoolError> {
        let permit = self.gate.enter().await?;
        let conn = self.pool.acquire().await.map_err(|e| match e {
            sqlx::Error::PoolClosed => PoolError::Closed,
            other => PoolError::Connect(other),
        })?;
        Ok(PooledConnection {
            conn,
            _permit: permit,
        })
    }

    /// Run a parameterized query and return all rows.
    pub async fn fetch_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<MySqlRow>, PoolError> {
        let mut conn = self.acquire().await?;
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    /// Run a parameterized statement and return its result summary.
    pub async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<MySqlQueryResult, PoolError> {
        let mut conn = self.acquire().await?;
        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut *conn)
            .await?;
        Ok(result)
    }

    /// Stop admitting checkouts and drain every connection.
    pub async fn close(&self) -> Result<(), PoolError> {
        self.close_within(self.shutdown_timeout).await
    }

    pub async fn close_within(&self, timeout: Duration) -> Result<(), PoolError> {
        self.gate.close();
        tokio::time::timeout(timeout, self.pool.close())
            .await
            .map_err(|_| PoolError::DrainTimeout(timeout))?;
        tracing::info!("MySQL pool closed");
        Ok(())
    }
}
