//! # Connection Object
//!
//! Wraps one accepted TCP stream plus the per-connection `authenticated`
//! flag. Owns both halves directly (`into_split`) so the header parser can
//! hold a buffered reader while responses are written independently.
//!
//! ## Design Principles
//!
//! 1. **Serial By Construction**: one worker owns a `Connection`; nothing
//!    else touches its socket halves, so `authenticated` needs no lock.
//! 2. **Exact-Length Payloads**: `read_payload` always reads exactly the
//!    requested byte count, per the wire contract's length-prefixing.
//! 3. **Eager Flush**: every write flushes immediately — no response ever
//!    waits behind a future request's bytes.

use hkv_common::{response_for_error, HkvError, HkvResult, StringValue, RESP_OK, RESP_VALUES};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::request::{self, Request};

/// Per-client connection state: the byte stream plus the auth gate.
pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    pub authenticated: bool,
}

impl Connection {
    /// Wraps an accepted stream. `authenticated` is the server's initial
    /// policy: true when no credential store is configured.
    pub fn new(stream: TcpStream, authenticated: bool) -> Self {
        let (read_half, write_half) = stream.into_split();
        Connection {
            reader: BufReader::new(read_half),
            writer: write_half,
            authenticated,
        }
    }

    /// Reads one request header from the stream.
    pub async fn read_request(&mut self) -> HkvResult<Request> {
        request::read_request(&mut self.reader).await
    }

    /// Reads exactly `len` payload bytes following a header that declared
    /// them (`SET`/`HSET`). Best-effort consumes a trailing CRLF if the
    /// client already buffered one; does not wait for bytes that never
    /// arrive, per the wire contract's "not required but tolerated" rule.
    pub async fn read_payload(&mut self, len: usize) -> HkvResult<StringValue> {
        let mut buf = vec![0u8; len];
        self.reader
            .read_exact(&mut buf)
            .await
            .map_err(HkvError::StreamError)?;
        if self.reader.buffer().starts_with(b"\r\n") {
            self.reader.consume(2);
        }
        Ok(StringValue::new(buf))
    }

    /// Writes the `OK` status line.
    pub async fn write_ok(&mut self) -> HkvResult<()> {
        self.write_line(RESP_OK).await
    }

    /// Writes the status line corresponding to `err`. Callers must not call
    /// this for a fatal (`StreamError`) error — there is no token for it.
    pub async fn write_error(&mut self, err: &HkvError) -> HkvResult<()> {
        let token = response_for_error(err).unwrap_or("ERROR");
        self.write_line(token).await
    }

    /// Writes a `VALUES` block: count, then `<len>\r\n<bytes>` per value.
    /// Values themselves carry no trailing delimiter — the length prefix is
    /// authoritative.
    pub async fn write_values(&mut self, values: &[Vec<u8>]) -> HkvResult<()> {
        let mut buf = Vec::new();
        buf.extend_from_slice(RESP_VALUES.as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(values.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        for value in values {
            buf.extend_from_slice(value.len().to_string().as_bytes());
            buf.extend_from_slice(b"\r\n");
            buf.extend_from_slice(value);
        }
        self.writer.write_all(&buf).await.map_err(HkvError::StreamError)?;
        self.writer.flush().await.map_err(HkvError::StreamError)?;
        Ok(())
    }

    async fn write_line(&mut self, token: &str) -> HkvResult<()> {
        self.writer
            .write_all(token.as_bytes())
            .await
            .map_err(HkvError::StreamError)?;
        self.writer.write_all(b"\r\n").await.map_err(HkvError::StreamError)?;
        self.writer.flush().await.map_err(HkvError::StreamError)?;
        Ok(())
    }

    /// Closes the write half, best-effort. Errors here are not actionable.
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
    }
}
