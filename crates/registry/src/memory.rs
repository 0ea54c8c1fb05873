//! In-memory session store.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{RegistryError, SessionRecord, SessionStore};

/// Session store backed by a process-local map.
///
/// State dies with the process; used by tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, signature: &str) -> Result<Option<SessionRecord>, RegistryError> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions.get(signature).copied())
    }

    fn create(
        &self,
        signature: &str,
        size: u64,
        chunks: u64,
    ) -> Result<SessionRecord, RegistryError> {
        let mut sessions = self.sessions.write().unwrap();
        let record = sessions
            .entry(signature.to_string())
            .or_insert_with(|| SessionRecord::new(size, chunks));
        Ok(*record)
    }

    fn increment_received(&self, signature: &str) -> Result<u64, RegistryError> {
        let mut sessions = self.sessions.write().unwrap();
        let record = sessions
            .get_mut(signature)
            .ok_or_else(|| RegistryError::SessionNotFound(signature.to_string()))?;
        record.uploaded_chunks += 1;
        Ok(record.uploaded_chunks)
    }
}
