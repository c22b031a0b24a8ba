//! # Wire Encoding
//!
//! Purpose: Encode requests and decode responses for HybridKV's line-based
//! protocol — not RESP2. A request is one CRLF header line, optionally
//! followed by a raw payload the caller already knows the length of; a
//! response is either a status line or a `VALUES` block.
//!
//! ## Design Principles
//! 1. **Length-Prefixed, Not Delimited**: payload and value bytes are read
//!    by declared length, never by scanning for a terminator.
//! 2. **No Partial Reads**: `read_response` blocks until a full response has
//!    arrived or the stream errors.

use std::io::{self, BufRead, Read, Write};

/// A decoded server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A plain status line that is not `VALUES` and starts with neither an
    /// error token the caller recognizes nor `OK` specifically — callers
    /// match on the exact token via `Status`.
    Status(String),
    /// A `VALUES` block, in declaration order.
    Values(Vec<Vec<u8>>),
}

/// Appends one encoded request line (and payload, if given) to `buf`.
pub fn encode_command(command: &str, args: &[&[u8]], payload: Option<&[u8]>, buf: &mut Vec<u8>) {
    buf.extend_from_slice(command.as_bytes());
    for arg in args {
        buf.push(b' ');
        buf.extend_from_slice(arg);
    }
    buf.extend_from_slice(b"\r\n");
    if let Some(data) = payload {
        buf.extend_from_slice(data);
    }
}

/// Reads one response from `reader`: a status line, or a `VALUES` block.
pub fn read_response<R: BufRead>(reader: &mut R, line_buf: &mut Vec<u8>) -> io::Result<Response> {
    read_line(reader, line_buf)?;
    let line = std::str::from_utf8(line_buf)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "non-utf8 status line"))?;

    if line == "VALUES" {
        let mut count_buf = Vec::new();
        read_line(reader, &mut count_buf)?;
        let count = parse_usize(&count_buf)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let mut len_buf = Vec::new();
            read_line(reader, &mut len_buf)?;
            let len = parse_usize(&len_buf)?;
            let mut data = vec![0u8; len];
            reader.read_exact(&mut data)?;
            values.push(data);
        }
        Ok(Response::Values(values))
    } else {
        Ok(Response::Status(line.to_string()))
    }
}

fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<()> {
    buf.clear();
    let bytes = reader.read_until(b'\n', buf)?;
    if bytes == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"));
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "line missing CRLF"));
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn parse_usize(data: &[u8]) -> io::Result<usize> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "expected a decimal length"))
}

/// Writes a request to `writer` and flushes it.
pub fn send_command<W: Write>(writer: &mut W, buf: &[u8]) -> io::Result<()> {
    writer.write_all(buf)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn encodes_command_with_args_and_payload() {
        let mut buf = Vec::new();
        encode_command("SET", &[b"key", b"3"], Some(b"foo"), &mut buf);
        assert_eq!(buf, b"SET key 3\r\nfoo");
    }

    #[test]
    fn decodes_status_line() {
        let mut cursor = Cursor::new(b"OK\r\n".to_vec());
        let mut line_buf = Vec::new();
        let response = read_response(&mut cursor, &mut line_buf).unwrap();
        assert_eq!(response, Response::Status("OK".to_string()));
    }

    #[test]
    fn decodes_values_block() {
        let mut cursor = Cursor::new(b"VALUES\r\n2\r\n3\r\nfoo3\r\nbar".to_vec());
        let mut line_buf = Vec::new();
        let response = read_response(&mut cursor, &mut line_buf).unwrap();
        assert_eq!(
            response,
            Response::Values(vec![b"foo".to_vec(), b"bar".to_vec()])
        );
    }
}
