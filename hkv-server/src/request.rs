//! # Request Parsing
//!
//! Reads one CRLF-terminated header line from a connection and splits it on
//! runs of ASCII space/tab. The payload that `SET`/`HSET` carry is *not*
//! read here — the handler pulls it later with an explicit length, once it
//! knows how many bytes to expect.

use hkv_common::{split_tokens, HkvError, HkvResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One parsed request header: a command token plus its arguments.
#[derive(Debug)]
pub struct Request {
    pub command: String,
    pub args: Vec<String>,
}

/// Reads and parses one header line from `reader`.
///
/// An EOF before any bytes are read, or a header with no non-whitespace
/// tokens, both terminate the connection (mapped to `HkvError::StreamError`
/// since neither produces a wire reply per the worker's failure semantics).
pub async fn read_request<R>(reader: &mut R) -> HkvResult<Request>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .await
        .map_err(HkvError::StreamError)?;
    if n == 0 {
        return Err(HkvError::StreamError(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stream closed",
        )));
    }

    let trimmed = line.trim_end_matches(['\r', '\n']);
    let tokens = split_tokens(trimmed);
    if tokens.is_empty() {
        return Err(HkvError::StreamError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "empty request",
        )));
    }

    let command = tokens[0].to_string();
    let args = tokens[1..].iter().map(|s| s.to_string()).collect();
    Ok(Request { command, args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn parses_command_and_args() {
        let mut reader = BufReader::new(Cursor::new(b"SET foo 0 3\r\n".to_vec()));
        let req = read_request(&mut reader).await.unwrap();
        assert_eq!(req.command, "SET");
        assert_eq!(req.args, vec!["foo", "0", "3"]);
    }

    #[tokio::test]
    async fn collapses_whitespace_runs() {
        let mut reader = BufReader::new(Cursor::new(b"GET   foo\r\n".to_vec()));
        let req = read_request(&mut reader).await.unwrap();
        assert_eq!(req.args, vec!["foo"]);
    }

    #[tokio::test]
    async fn empty_header_is_fatal() {
        let mut reader = BufReader::new(Cursor::new(b"\r\n".to_vec()));
        assert!(read_request(&mut reader).await.unwrap_err().is_fatal());
    }

    #[tokio::test]
    async fn eof_before_crlf_is_fatal() {
        let mut reader = BufReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(read_request(&mut reader).await.unwrap_err().is_fatal());
    }
}
