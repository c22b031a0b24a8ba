//! # HybridKV Sync Client
//!
//! Provide a lightweight, synchronous client with connection pooling for
//! HybridKV's line-based wire protocol.

mod client;
mod pool;
mod wire;

pub use client::{ClientConfig, ClientError, ClientResult, KVClient};
pub use pool::{ConnectionPool, PoolConfig, PooledConnection};
pub use wire::Response;
