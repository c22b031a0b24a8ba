//! # Wire Vocabulary
//!
//! The command table and response tokens shared by the server's request
//! parser/dispatcher and the client's encoder/decoder, so the two sides can
//! never drift on command names, arities, or status lines.
//!
//! ## Design Principles
//!
//! 1. **One Source of Truth**: `hkv-server` and `hkv-client` both import
//!    this module instead of re-declaring command names or status tokens.
//! 2. **ASCII, CRLF-Delimited**: every token below is exactly the bytes that
//!    cross the wire; no serialization framework sits between this module
//!    and the socket.
//! 3. **Fail Fast**: `Command::parse` and arity checks are pure functions,
//!    so validation happens before any storage call runs.

use crate::error::HkvError;

/// CRLF terminator used by every header line and status line.
pub const CRLF: &str = "\r\n";

/// `OK` status line.
pub const RESP_OK: &str = "OK";
/// `NOT_FOUND` status line.
pub const RESP_NOT_FOUND: &str = "NOT_FOUND";
/// `ERROR` status line.
pub const RESP_ERROR: &str = "ERROR";
/// `WRONG_COMMAND` status line.
pub const RESP_WRONG_COMMAND: &str = "WRONG_COMMAND";
/// `AUTH_REQUIRED` status line.
pub const RESP_AUTH_REQUIRED: &str = "AUTH_REQUIRED";
/// `BAD_FORMAT` status line.
pub const RESP_BAD_FORMAT: &str = "BAD_FORMAT";
/// `VALUES` compound response header.
pub const RESP_VALUES: &str = "VALUES";

/// Maps a dispatch-time error to the exact status line the protocol defines.
///
/// Returns `None` for `HkvError::StreamError`, which has no reply: the
/// caller closes the connection instead.
pub const fn response_for_error(err: &HkvError) -> Option<&'static str> {
    match err {
        HkvError::NotFound => Some(RESP_NOT_FOUND),
        HkvError::BadFormat => Some(RESP_BAD_FORMAT),
        HkvError::Arity => Some(RESP_ERROR),
        HkvError::UnknownCommand => Some(RESP_WRONG_COMMAND),
        HkvError::AuthRequired => Some(RESP_AUTH_REQUIRED),
        HkvError::WrongType | HkvError::Internal(_) => Some(RESP_ERROR),
        HkvError::StreamError(_) => None,
    }
}

/// Every command the dispatch table recognizes, plus its expected arity.
///
/// Arity counts arguments after the command token; it does not count the
/// payload that `SET`/`HSET` read separately via `read_exact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Get,
    Set,
    HGet,
    HSet,
    HGetAll,
    Delete,
    Keys,
    Expire,
    Auth,
    Quit,
}

impl Command {
    /// Parses a command token (case-insensitively) into a `Command`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Some(Command::Get),
            "SET" => Some(Command::Set),
            "HGET" => Some(Command::HGet),
            "HSET" => Some(Command::HSet),
            "HGETALL" => Some(Command::HGetAll),
            "DELETE" => Some(Command::Delete),
            "KEYS" => Some(Command::Keys),
            "EXPIRE" => Some(Command::Expire),
            "AUTH" => Some(Command::Auth),
            "QUIT" => Some(Command::Quit),
            _ => None,
        }
    }

    /// Returns the canonical uppercase command name.
    pub const fn name(self) -> &'static str {
        match self {
            Command::Get => "GET",
            Command::Set => "SET",
            Command::HGet => "HGET",
            Command::HSet => "HSET",
            Command::HGetAll => "HGETALL",
            Command::Delete => "DELETE",
            Command::Keys => "KEYS",
            Command::Expire => "EXPIRE",
            Command::Auth => "AUTH",
            Command::Quit => "QUIT",
        }
    }

    /// Returns the number of arguments (excluding any payload) this command
    /// expects after the command token.
    pub const fn arity(self) -> usize {
        match self {
            Command::Get => 1,
            Command::Set => 3,
            Command::HGet => 2,
            Command::HSet => 3,
            Command::HGetAll => 1,
            Command::Delete => 1,
            Command::Keys => 0,
            Command::Expire => 2,
            Command::Auth => 2,
            Command::Quit => 0,
        }
    }

    /// Returns true when this command carries a trailing length-prefixed
    /// payload (`SET`, `HSET`) that the handler reads after the header.
    pub const fn has_payload(self) -> bool {
        matches!(self, Command::Set | Command::HSet)
    }

    /// Returns true when this command may run before `AUTH` succeeds. Only
    /// `AUTH` itself is exempt from the gate; `QUIT` still requires it.
    pub const fn allowed_before_auth(self) -> bool {
        matches!(self, Command::Auth)
    }
}

/// Splits a header line into whitespace-separated tokens, collapsing runs
/// of ASCII space/tab the way the request parser requires.
pub fn split_tokens(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ' ' || c == '\t')
        .filter(|tok| !tok.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Command::parse("get"), Some(Command::Get));
        assert_eq!(Command::parse("Get"), Some(Command::Get));
        assert_eq!(Command::parse("GET"), Some(Command::Get));
    }

    #[test]
    fn rejects_unknown_command() {
        assert_eq!(Command::parse("FOO"), None);
    }

    #[test]
    fn arity_table_matches_spec() {
        assert_eq!(Command::Get.arity(), 1);
        assert_eq!(Command::Set.arity(), 3);
        assert_eq!(Command::HGet.arity(), 2);
        assert_eq!(Command::HSet.arity(), 3);
        assert_eq!(Command::HGetAll.arity(), 1);
        assert_eq!(Command::Delete.arity(), 1);
        assert_eq!(Command::Keys.arity(), 0);
        assert_eq!(Command::Expire.arity(), 2);
        assert_eq!(Command::Auth.arity(), 2);
        assert_eq!(Command::Quit.arity(), 0);
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(split_tokens("SET  foo\t0   3"), vec!["SET", "foo", "0", "3"]);
    }

    #[test]
    fn maps_errors_to_tokens() {
        assert_eq!(response_for_error(&HkvError::NotFound), Some(RESP_NOT_FOUND));
        assert_eq!(response_for_error(&HkvError::Arity), Some(RESP_ERROR));
        assert_eq!(response_for_error(&HkvError::UnknownCommand), Some(RESP_WRONG_COMMAND));
    }
}
