//! # HybridKV Server Library
//!
//! The binary (`main.rs`) is a thin CLI wrapper over this library: pick a
//! storage backend, optionally load a credential store, bind a listener,
//! and hand off each accepted connection to [`server::handle_connection`].

pub mod commands;
pub mod connection;
pub mod credentials;
pub mod metrics;
pub mod request;
pub mod server;
