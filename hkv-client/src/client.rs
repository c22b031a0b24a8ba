//! # Synchronous Client API
//!
//! Purpose: Expose a compact, blocking API for issuing HybridKV commands
//! over the project's line-based wire protocol (not RESP2).
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `KVClient` hides pooling and protocol details.
//! 2. **Borrow-Friendly API**: Accept `&[u8]` to avoid unnecessary copies.
//! 3. **Fail Fast**: Protocol violations surface immediately as errors.

use std::fmt;
use std::time::Duration;

use crate::pool::{ConnectionPool, PoolConfig};
use crate::wire::Response;

/// Result type for the sync client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the sync client.
#[derive(Debug)]
pub enum ClientError {
    /// Network or IO failure while reading/writing.
    Io(std::io::Error),
    /// Server returned a status token that is not in the success set for
    /// the command that was issued.
    Server { token: String },
    /// Response shape did not match what the command expects.
    UnexpectedResponse,
    /// Pool is at capacity and no idle connections are available.
    PoolExhausted,
    /// Address could not be parsed into a socket address.
    InvalidAddress,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Io(err) => write!(f, "io error: {err}"),
            ClientError::Server { token } => write!(f, "server error: {token}"),
            ClientError::UnexpectedResponse => write!(f, "unexpected response"),
            ClientError::PoolExhausted => write!(f, "connection pool exhausted"),
            ClientError::InvalidAddress => write!(f, "invalid address"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err)
    }
}

/// Configuration for the synchronous client and its pool.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address, e.g. "127.0.0.1:20000".
    pub addr: String,
    /// Maximum idle connections kept in the pool.
    pub max_idle: usize,
    /// Maximum total connections (idle + in-use).
    pub max_total: usize,
    /// Optional TCP read timeout.
    pub read_timeout: Option<Duration>,
    /// Optional TCP write timeout.
    pub write_timeout: Option<Duration>,
    /// Optional TCP connect timeout.
    pub connect_timeout: Option<Duration>,
}

/// Default per-request I/O deadline: every lease gets a 1-second timeout on
/// read, write, and connect unless the caller overrides it.
const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(1);

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: "127.0.0.1:20000".to_string(),
            max_idle: 8,
            max_total: 16,
            read_timeout: Some(DEFAULT_IO_TIMEOUT),
            write_timeout: Some(DEFAULT_IO_TIMEOUT),
            connect_timeout: Some(DEFAULT_IO_TIMEOUT),
        }
    }
}

/// Synchronous client with connection pooling.
///
/// Each call acquires a connection, executes one command, and returns the
/// connection to the pool. Connections are not pre-authenticated; call
/// [`KVClient::auth`] on a fresh pool before issuing other commands against
/// a server that requires it.
pub struct KVClient {
    pool: ConnectionPool,
}

impl KVClient {
    /// Creates a client with default configuration.
    pub fn connect(addr: impl Into<String>) -> ClientResult<Self> {
        let mut config = ClientConfig::default();
        config.addr = addr.into();
        Self::with_config(config)
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(config: ClientConfig) -> ClientResult<Self> {
        let pool = ConnectionPool::new(PoolConfig {
            addr: config.addr,
            max_idle: config.max_idle,
            max_total: config.max_total,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
            connect_timeout: config.connect_timeout,
        })?;
        Ok(KVClient { pool })
    }

    /// Authenticates the connection used for this call. Pooled connections
    /// are per-call; callers talking to an authenticated server should use
    /// a pool sized to 1 or re-auth is required per acquired connection.
    pub fn auth(&self, user: &[u8], password: &[u8]) -> ClientResult<()> {
        let mut conn = self.pool.acquire()?;
        match conn.exec("AUTH", &[user, password], None)? {
            Response::Status(s) if s == "OK" => Ok(()),
            Response::Status(token) => Err(ClientError::Server { token }),
            Response::Values(_) => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Fetches a string value by key. Returns `Ok(None)` when the key is
    /// missing or expired.
    pub fn get(&self, key: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        let mut conn = self.pool.acquire()?;
        match conn.exec("GET", &[key], None)? {
            Response::Values(mut values) if values.len() == 1 => Ok(Some(values.remove(0))),
            Response::Status(token) if token == "NOT_FOUND" => Ok(None),
            Response::Status(token) => Err(ClientError::Server { token }),
            Response::Values(_) => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Sets a string value with no expiration.
    pub fn set(&self, key: &[u8], value: &[u8]) -> ClientResult<()> {
        self.set_with_ttl(key, value, 0)
    }

    /// Sets a string value with a TTL in seconds; `0` means no expiration.
    pub fn set_with_ttl(&self, key: &[u8], value: &[u8], ttl_secs: u64) -> ClientResult<()> {
        let mut conn = self.pool.acquire()?;
        let len = value.len().to_string();
        let ttl = ttl_secs.to_string();
        match conn.exec("SET", &[key, ttl.as_bytes(), len.as_bytes()], Some(value))? {
            Response::Status(token) if token == "OK" => Ok(()),
            Response::Status(token) => Err(ClientError::Server { token }),
            Response::Values(_) => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Fetches one field of a hash. Returns `Ok(None)` when the key or
    /// field is missing.
    pub fn hget(&self, key: &[u8], field: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        let mut conn = self.pool.acquire()?;
        match conn.exec("HGET", &[key, field], None)? {
            Response::Values(mut values) if values.len() == 1 => Ok(Some(values.remove(0))),
            Response::Status(token) if token == "NOT_FOUND" => Ok(None),
            Response::Status(token) => Err(ClientError::Server { token }),
            Response::Values(_) => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Sets one field of a hash, creating the hash if it does not exist.
    pub fn hset(&self, key: &[u8], field: &[u8], value: &[u8]) -> ClientResult<()> {
        let mut conn = self.pool.acquire()?;
        let len = value.len().to_string();
        match conn.exec("HSET", &[key, field, len.as_bytes()], Some(value))? {
            Response::Status(token) if token == "OK" => Ok(()),
            Response::Status(token) => Err(ClientError::Server { token }),
            Response::Values(_) => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Fetches every field/value pair of a hash.
    pub fn hgetall(&self, key: &[u8]) -> ClientResult<Option<Vec<(Vec<u8>, Vec<u8>)>>> {
        let mut conn = self.pool.acquire()?;
        match conn.exec("HGETALL", &[key], None)? {
            Response::Values(values) => {
                let mut pairs = Vec::with_capacity(values.len() / 2);
                let mut iter = values.into_iter();
                while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
                    pairs.push((field, value));
                }
                Ok(Some(pairs))
            }
            Response::Status(token) if token == "NOT_FOUND" => Ok(None),
            Response::Status(token) => Err(ClientError::Server { token }),
        }
    }

    /// Deletes a key. Always succeeds, whether or not the key existed.
    pub fn delete(&self, key: &[u8]) -> ClientResult<()> {
        let mut conn = self.pool.acquire()?;
        match conn.exec("DELETE", &[key], None)? {
            Response::Status(token) if token == "OK" => Ok(()),
            Response::Status(token) => Err(ClientError::Server { token }),
            Response::Values(_) => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Lists every live (non-expired) key.
    pub fn keys(&self) -> ClientResult<Vec<Vec<u8>>> {
        let mut conn = self.pool.acquire()?;
        match conn.exec("KEYS", &[], None)? {
            Response::Values(values) => Ok(values),
            Response::Status(token) => Err(ClientError::Server { token }),
        }
    }

    /// Sets a new TTL on an existing, non-expired key. Returns `false` when
    /// the key was missing or already expired.
    pub fn expire(&self, key: &[u8], ttl_secs: u64) -> ClientResult<bool> {
        let mut conn = self.pool.acquire()?;
        let ttl = ttl_secs.to_string();
        match conn.exec("EXPIRE", &[key, ttl.as_bytes()], None)? {
            Response::Status(token) if token == "OK" => Ok(true),
            Response::Status(token) if token == "NOT_FOUND" => Ok(false),
            Response::Status(token) => Err(ClientError::Server { token }),
            Response::Values(_) => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Sends `QUIT`, which the server answers with `OK` before closing.
    pub fn quit(&self) -> ClientResult<()> {
        let mut conn = self.pool.acquire()?;
        match conn.exec("QUIT", &[], None)? {
            Response::Status(token) if token == "OK" => Ok(()),
            Response::Status(token) => Err(ClientError::Server { token }),
            Response::Values(_) => Err(ClientError::UnexpectedResponse),
        }
    }
}
