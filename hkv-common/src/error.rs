//! # HybridKV Error Types
//!
//! ## Design Principles
//!
//! 1. **Categorized Taxonomy**: Each variant belongs to exactly one of the
//!    client/protocol/transport failure categories the server and client
//!    both need to reason about.
//! 2. **One Wire Token Per Variant**: `wire_token` is the single place that
//!    maps a failure to the textual status line the protocol defines.
//! 3. **Recoverability Hints**: `StreamError` is the only variant that means
//!    "close the connection"; everything else yields one reply and the
//!    worker keeps reading the next request.

use std::io;

/// Result type used across HybridKV components.
pub type HkvResult<T> = Result<T, HkvError>;

/// Errors surfaced by the storage engine, command dispatch, and clients.
#[derive(Debug, thiserror::Error)]
pub enum HkvError {
    /// Key absent, or present but expired.
    #[error("not found")]
    NotFound,

    /// Key exists but holds the other value shape (string vs. hash).
    #[error("wrong type")]
    WrongType,

    /// A numeric argument (ttl, length) was missing, non-numeric, or negative.
    #[error("bad format")]
    BadFormat,

    /// Argument count did not match the command's expected arity.
    #[error("wrong number of arguments")]
    Arity,

    /// Command token is not in the dispatch table.
    #[error("unknown command")]
    UnknownCommand,

    /// Command issued on a connection that has not completed AUTH.
    #[error("authentication required")]
    AuthRequired,

    /// Parse/read/write failure on the underlying stream; terminal for the
    /// connection that produced it.
    #[error("stream error: {0}")]
    StreamError(#[from] io::Error),

    /// Any failure that does not fit the categories above.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HkvError {
    /// Returns the exact wire token this error maps to, per the protocol's
    /// response vocabulary. `StreamError` has no token: the caller closes
    /// the connection instead of replying.
    pub const fn wire_token(&self) -> Option<&'static str> {
        match self {
            HkvError::NotFound => Some("NOT_FOUND"),
            HkvError::BadFormat => Some("BAD_FORMAT"),
            HkvError::Arity => Some("ERROR"),
            HkvError::UnknownCommand => Some("WRONG_COMMAND"),
            HkvError::AuthRequired => Some("AUTH_REQUIRED"),
            HkvError::WrongType | HkvError::Internal(_) => Some("ERROR"),
            HkvError::StreamError(_) => None,
        }
    }

    /// True when the error terminates the connection rather than producing
    /// a single framed reply.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, HkvError::StreamError(_))
    }
}
