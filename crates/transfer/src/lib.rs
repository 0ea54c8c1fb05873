//! Upload coordination: staging-file assembly and content verification.
//!
//! The [`Coordinator`] is the only component with business logic: it pairs
//! every chunk append with a registry counter bump under a per-signature
//! lock, detects completion, and re-derives the content signature from the
//! assembled staging file to decide verified vs corrupt.

mod coordinator;
mod digest;
mod staging;

pub use coordinator::{AppendOutcome, Coordinator, ProbeOutcome, VerifyReport};
pub use digest::{signature_bytes, signature_of_file};
pub use staging::{StagingArea, validate_signature};

/// Block size for streaming a staging file through the digest: 10 MiB.
///
/// Bounds peak memory during verification while keeping read syscalls
/// negligible against disk throughput.
pub const DIGEST_BLOCK_SIZE: usize = 10 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("invalid signature: {0:?}")]
    InvalidSignature(String),

    #[error("chunk size mismatch: declared {declared}, got {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    #[error("upload already fully received: {0}")]
    UploadComplete(String),

    #[error(transparent)]
    Registry(#[from] chunkd_registry::RegistryError),
}
