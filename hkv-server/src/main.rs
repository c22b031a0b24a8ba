//! # HybridKV Server
//!
//! Binds the configured address and serves the wire protocol over it, with
//! the storage backend selected by the `--buckets`/`--bucket_size` flags.
//!
//! ## Design Principles
//!
//! 1. **Minimal Surface**: flags are parsed by hand (`--flag value` pairs),
//!    no argument-parsing crate — the CLI is explicitly out of the tested
//!    core contract.
//! 2. **Fail on Bind, Not on Client Errors**: a bad accept is fatal; a bad
//!    client request never is.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hkv_engine::{BucketStorage, LRUStorage, Memory, Storage};
use hkv_server::credentials::CredentialStore;
use hkv_server::metrics::Metrics;
use hkv_server::server;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tracing::info;

struct Config {
    bind: String,
    users: Option<PathBuf>,
    gc_period: Duration,
    buckets: Option<usize>,
    bucket_size: Option<usize>,
}

impl Config {
    fn from_args() -> Self {
        let mut bind = ":20000".to_string();
        let mut users = None;
        let mut gc_period = Duration::from_secs(10);
        let mut buckets = None;
        let mut bucket_size = None;

        let args: Vec<String> = std::env::args().collect();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--bind" => {
                    bind = args.get(i + 1).cloned().unwrap_or(bind);
                    i += 2;
                }
                "--users" => {
                    users = args.get(i + 1).map(PathBuf::from);
                    i += 2;
                }
                "--gc_period" => {
                    if let Some(secs) = args.get(i + 1).and_then(|s| s.parse::<u64>().ok()) {
                        gc_period = Duration::from_secs(secs);
                    }
                    i += 2;
                }
                "--buckets" => {
                    buckets = args.get(i + 1).and_then(|s| s.parse::<usize>().ok());
                    i += 2;
                }
                "--bucket_size" => {
                    bucket_size = args.get(i + 1).and_then(|s| s.parse::<usize>().ok());
                    i += 2;
                }
                _ => i += 1,
            }
        }

        Config {
            bind,
            users,
            gc_period,
            buckets,
            bucket_size,
        }
    }
}

/// `:20000` means "bind on every interface"; `SocketAddr` needs a host.
fn normalize_bind(addr: &str) -> String {
    if let Some(port) = addr.strip_prefix(':') {
        format!("0.0.0.0:{port}")
    } else {
        addr.to_string()
    }
}

fn bind_listener(addr: &str) -> std::io::Result<TcpListener> {
    let sock_addr: SocketAddr = normalize_bind(addr)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{e}")))?;
    let socket = Socket::new(Domain::for_address(sock_addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&sock_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    TcpListener::from_std(socket.into())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_args();

    let storage: Arc<dyn Storage> = match (config.buckets, config.bucket_size) {
        (Some(n), Some(size)) => {
            info!(shards = n, bucket_size = size, "using sharded LRU storage");
            Arc::new(BucketStorage::new(n, move |_| {
                Box::new(LRUStorage::new(size)) as Box<dyn Storage>
            }))
        }
        _ => {
            info!(gc_period_secs = config.gc_period.as_secs(), "using unbounded memory storage");
            Arc::new(Memory::new(config.gc_period))
        }
    };

    let creds = match &config.users {
        Some(path) => {
            let store = CredentialStore::load_from_path(path)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{e}")))?;
            info!(path = %path.display(), "authentication enabled");
            Some(Arc::new(store))
        }
        None => None,
    };

    let metrics = Arc::new(Metrics::new());
    let listener = bind_listener(&config.bind)?;
    info!(bind = %config.bind, "hkv-server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let storage = Arc::clone(&storage);
        let creds = creds.clone();
        let metrics = Arc::clone(&metrics);
        tokio::spawn(async move {
            tracing::debug!(%peer, "connection accepted");
            server::handle_connection(stream, storage, creds, metrics).await;
        });
    }
}
