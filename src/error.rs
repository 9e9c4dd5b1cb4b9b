//! Unified error type for the resolver daemon.
//!
//! Mirrors the teacher's `HeimdallError` shape: one flat `thiserror` enum per
//! concern rather than a tree of nested error types, with `From` impls at the
//! boundaries (`std::io::Error`, `serde_json::Error`) so `?` works end to end.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DnsCachedError>;

/// Startup-time configuration problems. Fatal: the process exits on these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid cache policy {0:?}, expected \"default\" or \"keep-most-used\"")]
    InvalidPolicy(String),
    #[error("invalid pre-seeded cache entry {key:?}: {reason}")]
    InvalidSeedEntry { key: String, reason: String },
}

/// Errors surfaced while handling a single query or administering the cache.
/// These never unwind past the component boundary that produced them: a query
/// handler error becomes a DNS rcode, an admin error becomes an HTTP 400.
#[derive(Debug, Error)]
pub enum DnsCachedError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("upstream I/O error: {0}")]
    UpstreamIo(String),

    #[error("upstream returned a malformed DNS message: {0}")]
    UpstreamMalformed(String),

    #[error("no upstream produced a response")]
    UpstreamExhausted,

    #[error("failed to decode DNS message: {0}")]
    Decode(String),

    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}
