//! Protocol constants shared by client and server.

use serde::{Deserialize, Serialize};

/// Maximum size of a single WebSocket frame, text or binary.
///
/// A binary chunk frame is `4 + header + payload` bytes, so this bounds the
/// largest chunk a client may send. 32 MiB leaves ample headroom over the
/// 4 MiB chunks a typical client cuts.
pub const MAX_FRAME_SIZE: usize = 32 * 1024 * 1024;

/// Chunk size clients are expected to default to: 4 MiB.
///
/// Larger chunks reduce per-chunk overhead (registry writes, ACKs,
/// syscalls). The server accepts any chunk size up to [`MAX_FRAME_SIZE`].
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// All message types in the chunkd wire protocol.
///
/// Serialized as snake_case strings in the envelope's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Client registers an upload or asks how much of it was received.
    Probe,
    /// Server answer to a probe: exists + resume point.
    ProbeResponse,
    /// Server acknowledgment of a single accepted chunk.
    ChunkAck,
    /// Server verification verdict for a fully received upload.
    UploadReport,
    /// Liveness check.
    Ping,
    /// Liveness reply.
    Pong,
    /// Error reply; details in the envelope's `error` field.
    Error,
}
