//! Durable per-upload session registry.
//!
//! The registry is the single source of truth for "how far along is this
//! upload": a mapping from content signature to declared size, declared
//! chunk count, and chunks received so far. [`MemoryStore`] keeps it in
//! process memory; [`FileStore`] writes one JSON document per signature so
//! the state survives a restart.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

/// Persisted state of one upload session, keyed by its content signature.
///
/// The JSON shape (`size` / `chunks` / `uploaded_chunks`) is the wire and
/// storage contract; the signature itself is the record's key, not a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Declared total byte length of the final file.
    pub size: u64,
    /// Number of chunks the client intends to send.
    pub chunks: u64,
    /// Chunks successfully applied so far. Starts at 0, only ever grows.
    pub uploaded_chunks: u64,
}

impl SessionRecord {
    /// A fresh record with no chunks received.
    pub fn new(size: u64, chunks: u64) -> Self {
        Self {
            size,
            chunks,
            uploaded_chunks: 0,
        }
    }

    /// Whether every declared chunk has been received.
    ///
    /// Necessary but not sufficient for "complete" — verification against
    /// the staging file still has to pass.
    pub fn is_fully_received(&self) -> bool {
        self.uploaded_chunks == self.chunks
    }
}

/// Errors produced by a session store.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("storage I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt session record: {0}")]
    Corrupt(String),
}

/// Contract between the upload coordinator and the registry backing store.
///
/// `increment_received` must be atomic per signature even without any
/// external locking; callers for *different* signatures must not serialize
/// against each other. That alone does not make "append bytes + bump
/// counter" atomic — the coordinator layers a per-signature lock on top.
pub trait SessionStore: Send + Sync {
    /// Looks up a session. No side effects.
    fn get(&self, signature: &str) -> Result<Option<SessionRecord>, RegistryError>;

    /// Creates a session, or returns the existing one unchanged.
    ///
    /// Idempotent registration: a second create for a known signature never
    /// overwrites the record or resets its counter.
    fn create(&self, signature: &str, size: u64, chunks: u64)
    -> Result<SessionRecord, RegistryError>;

    /// Atomically bumps `uploaded_chunks` by 1 and returns the new value.
    fn increment_received(&self, signature: &str) -> Result<u64, RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_empty() {
        let record = SessionRecord::new(4096, 4);
        assert_eq!(record.uploaded_chunks, 0);
        assert!(!record.is_fully_received());
    }

    #[test]
    fn fully_received_at_declared_count() {
        let mut record = SessionRecord::new(100, 2);
        record.uploaded_chunks = 2;
        assert!(record.is_fully_received());
    }

    #[test]
    fn zero_chunk_record_is_fully_received() {
        // A zero-length upload declares zero chunks and needs none.
        let record = SessionRecord::new(0, 0);
        assert!(record.is_fully_received());
    }

    #[test]
    fn record_json_shape() {
        let record = SessionRecord::new(25, 2);
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"size": 25, "chunks": 2, "uploaded_chunks": 0})
        );
    }
}
