//! File-backed session store.
//!
//! One JSON document per signature under a metadata directory. Mutations
//! write through to disk via temp-file-then-rename, so a crash mid-write
//! leaves either the old record or the new one, never a torn file. The
//! in-memory index is rebuilt by scanning the directory on open — that scan
//! is what makes registry state survive a process restart.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::{RegistryError, SessionRecord, SessionStore};

/// Session store persisted as per-signature JSON documents.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    /// Each record sits behind its own mutex so same-signature mutations
    /// (memory update + disk write) are atomic without serializing
    /// different signatures against each other.
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionRecord>>>>,
}

impl FileStore {
    /// Opens (or creates) a store rooted at `dir`, loading every existing
    /// record.
    ///
    /// A record that fails to parse aborts the open with
    /// [`RegistryError::Corrupt`] — better to refuse startup than to
    /// silently restart an upload from zero.
    pub fn open(dir: &Path) -> Result<Self, RegistryError> {
        fs::create_dir_all(dir)?;

        let mut sessions = HashMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(signature) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let data = fs::read_to_string(&path)?;
            let record: SessionRecord = serde_json::from_str(&data)
                .map_err(|e| RegistryError::Corrupt(format!("{}: {e}", path.display())))?;
            sessions.insert(signature.to_string(), Arc::new(Mutex::new(record)));
        }

        if !sessions.is_empty() {
            tracing::info!(count = sessions.len(), dir = %dir.display(), "loaded session records");
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            sessions: RwLock::new(sessions),
        })
    }

    fn record_path(&self, signature: &str) -> PathBuf {
        self.dir.join(format!("{signature}.json"))
    }

    /// Writes a record to its document atomically.
    fn persist(&self, signature: &str, record: &SessionRecord) -> Result<(), RegistryError> {
        let data = serde_json::to_vec(record)
            .map_err(|e| RegistryError::Corrupt(format!("serialize {signature}: {e}")))?;
        let tmp = self.dir.join(format!("{signature}.json.tmp"));
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, self.record_path(signature))?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, signature: &str) -> Result<Option<SessionRecord>, RegistryError> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions.get(signature).map(|s| *s.lock().unwrap()))
    }

    fn create(
        &self,
        signature: &str,
        size: u64,
        chunks: u64,
    ) -> Result<SessionRecord, RegistryError> {
        // Fast path: already registered.
        {
            let sessions = self.sessions.read().unwrap();
            if let Some(existing) = sessions.get(signature) {
                return Ok(*existing.lock().unwrap());
            }
        }

        let mut sessions = self.sessions.write().unwrap();
        // Re-check under the write lock — another caller may have won.
        if let Some(existing) = sessions.get(signature) {
            return Ok(*existing.lock().unwrap());
        }

        let record = SessionRecord::new(size, chunks);
        self.persist(signature, &record)?;
        sessions.insert(signature.to_string(), Arc::new(Mutex::new(record)));
        Ok(record)
    }

    fn increment_received(&self, signature: &str) -> Result<u64, RegistryError> {
        let entry = {
            let sessions = self.sessions.read().unwrap();
            sessions
                .get(signature)
                .cloned()
                .ok_or_else(|| RegistryError::SessionNotFound(signature.to_string()))?
        };

        // Per-record mutex held across memory bump + disk write: a second
        // increment for the same signature cannot observe or persist a
        // stale count.
        let mut record = entry.lock().unwrap();
        record.uploaded_chunks += 1;
        if let Err(e) = self.persist(signature, &record) {
            record.uploaded_chunks -= 1;
            return Err(e);
        }
        Ok(record.uploaded_chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SIG: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    #[test]
    fn create_writes_document() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.create(SIG, 25, 2).unwrap();

        let data = fs::read_to_string(dir.path().join(format!("{SIG}.json"))).unwrap();
        let json: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(json["size"], 25);
        assert_eq!(json["chunks"], 2);
        assert_eq!(json["uploaded_chunks"], 0);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.create(SIG, 1024, 4).unwrap();
            store.increment_received(SIG).unwrap();
            store.increment_received(SIG).unwrap();
        }

        let reopened = FileStore::open(dir.path()).unwrap();
        let record = reopened.get(SIG).unwrap().unwrap();
        assert_eq!(record.size, 1024);
        assert_eq!(record.chunks, 4);
        assert_eq!(record.uploaded_chunks, 2);
    }

    #[test]
    fn create_is_idempotent_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.create(SIG, 100, 10).unwrap();
            store.increment_received(SIG).unwrap();
        }

        let reopened = FileStore::open(dir.path()).unwrap();
        let record = reopened.create(SIG, 999, 1).unwrap();
        assert_eq!(record.size, 100);
        assert_eq!(record.uploaded_chunks, 1);
    }

    #[test]
    fn increment_unknown_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let err = store.increment_received(SIG).unwrap_err();
        assert!(matches!(err, RegistryError::SessionNotFound(_)));
    }

    #[test]
    fn corrupt_record_fails_open() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(format!("{SIG}.json")), b"{not json").unwrap();
        let err = FileStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Corrupt(_)));
    }

    #[test]
    fn non_json_files_ignored_on_open() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README"), b"not a record").unwrap();
        // A leftover temp file from a crashed write is also skipped.
        fs::write(dir.path().join(format!("{SIG}.json.tmp")), b"garbage").unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.get(SIG).unwrap().is_none());
    }

    #[test]
    fn concurrent_increments_lose_nothing() {
        use std::thread;

        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        store.create(SIG, 100_000, 400).unwrap();

        let mut handles = vec![];
        for _ in 0..8 {
            let s = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    s.increment_received(SIG).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.get(SIG).unwrap().unwrap().uploaded_chunks, 400);

        // And the last persisted document agrees.
        let data = fs::read_to_string(dir.path().join(format!("{SIG}.json"))).unwrap();
        let record: SessionRecord = serde_json::from_str(&data).unwrap();
        assert_eq!(record.uploaded_chunks, 400);
    }
}
