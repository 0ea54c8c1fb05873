//! WebSocket server for the chunkd upload daemon.
//!
//! Accepts any number of concurrent client connections, dispatches JSON
//! envelopes and binary chunk frames to a [`Handler`], and manages the
//! connection lifecycle (ping/pong, graceful shutdown). The production
//! handler, [`UploadService`], delegates to the upload coordinator.

mod config;
mod connection;
mod frame;
mod handler;
mod server;
mod service;

pub use config::{Config, ConfigError};
pub use connection::Sender;
pub use frame::{FrameError, encode_chunk_frame, parse_chunk_frame};
pub use handler::{Handler, HandlerFuture};
pub use server::{ServerConfig, UploadServer};
pub use service::UploadService;

/// Per-connection reply buffer capacity.
///
/// Each inbound chunk produces exactly one reply (ACK or report), so the
/// buffer only has to absorb the client's in-flight pipeline. 256 gives
/// comfortable headroom; `try_send` failures surface as dropped replies,
/// which the client treats like a lost connection and re-probes.
pub const SEND_BUFFER_SIZE: usize = 256;

/// Errors produced by the server crate.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reply channel closed or full")]
    ChannelClosed,
}
