//! # TCP Server
//!
//! Accept connections, parse one request at a time, run the auth gate, and
//! dispatch to the storage engine.
//!
//! ## Design Principles
//!
//! 1. **Single Responsibility**: parsing, auth, and dispatch stay in their
//!    own modules; this file only wires the per-connection loop together.
//! 2. **Async First**: Tokio handles concurrent connections; each gets its
//!    own task and its own serial command loop.
//! 3. **Fail-Open Defaults**: a connection error is localized to that
//!    connection — the accept loop itself only stops on a listener error.

use std::sync::Arc;
use std::time::Instant;

use hkv_common::{Command, HkvError};
use hkv_engine::Storage;
use tokio::net::TcpStream;
use tracing::debug;

use crate::commands::{self, Outcome};
use crate::connection::Connection;
use crate::credentials::CredentialStore;
use crate::metrics::Metrics;

/// Runs the per-connection worker loop until the client disconnects, sends
/// `QUIT`, or a fatal stream error occurs.
pub async fn handle_connection(
    stream: TcpStream,
    storage: Arc<dyn Storage>,
    creds: Option<Arc<CredentialStore>>,
    metrics: Arc<Metrics>,
) {
    let mut conn = Connection::new(stream, creds.is_none());

    loop {
        let request = match conn.read_request().await {
            Ok(req) => req,
            Err(err) => {
                debug!(?err, "closing connection");
                break;
            }
        };

        let start = Instant::now();
        metrics.record_request_start();

        let Some(cmd) = Command::parse(&request.command) else {
            metrics.record_error();
            let _ = conn.write_error(&HkvError::UnknownCommand).await;
            metrics.record_request_end(start.elapsed());
            continue;
        };

        if cmd.allowed_before_auth() {
            handle_auth(&mut conn, &creds, &request.args, &metrics).await;
            metrics.record_request_end(start.elapsed());
            continue;
        }

        if !conn.authenticated {
            metrics.record_error();
            let _ = conn.write_error(&HkvError::AuthRequired).await;
            metrics.record_request_end(start.elapsed());
            continue;
        }

        if cmd == Command::Quit {
            let _ = conn.write_ok().await;
            metrics.record_request_end(start.elapsed());
            break;
        }

        if request.args.len() != cmd.arity() {
            metrics.record_error();
            let _ = conn.write_error(&HkvError::Arity).await;
            metrics.record_request_end(start.elapsed());
            continue;
        }

        match commands::dispatch(&mut conn, storage.as_ref(), cmd, &request.args).await {
            Ok(Outcome::Ok) => {
                let _ = conn.write_ok().await;
            }
            Ok(Outcome::Values(values)) => {
                let _ = conn.write_values(&values).await;
            }
            Err(err) if err.is_fatal() => {
                metrics.record_error();
                metrics.record_request_end(start.elapsed());
                break;
            }
            Err(err) => {
                metrics.record_error();
                let _ = conn.write_error(&err).await;
            }
        }

        metrics.record_request_end(start.elapsed());
    }

    conn.close().await;
}

async fn handle_auth(
    conn: &mut Connection,
    creds: &Option<Arc<CredentialStore>>,
    args: &[String],
    metrics: &Metrics,
) {
    if conn.authenticated {
        let _ = conn.write_ok().await;
        return;
    }

    if args.len() != 2 {
        metrics.record_error();
        let _ = conn.write_error(&HkvError::Arity).await;
        return;
    }

    let ok = match creds {
        Some(store) => store.validate(&args[0], &args[1]),
        None => true,
    };

    if ok {
        conn.authenticated = true;
        let _ = conn.write_ok().await;
    } else {
        metrics.record_error();
        let _ = conn.write_error(&HkvError::AuthRequired).await;
    }
}
