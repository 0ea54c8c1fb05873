//! The upload coordinator.
//!
//! Stateless orchestration over two shared resources addressed by the same
//! signature: the registry record and the staging file. The two are not
//! naturally atomic, so every operation for one signature runs under that
//! signature's lock; operations for different signatures proceed
//! independently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use chunkd_registry::SessionStore;

use crate::TransferError;
use crate::digest::signature_of_file;
use crate::staging::{StagingArea, validate_signature};

/// Verification verdict for a fully received upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub verified: bool,
    /// The client's original claim.
    pub expected_signature: String,
    /// Digest derived from the assembled staging file.
    pub actual_signature: String,
}

/// Result of a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Unknown signature: session registered, staging file created.
    New,
    /// Known session, still missing chunks; the client resumes after
    /// `uploaded_chunks`.
    Partial { uploaded_chunks: u64 },
    /// Every chunk received — verification re-ran against the current
    /// staging bytes.
    Report(VerifyReport),
}

/// Result of an accepted chunk append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Chunk applied; more expected.
    Accepted { uploaded_chunks: u64 },
    /// This chunk was the last one — verification ran immediately.
    Report(VerifyReport),
}

/// Orchestrates session lifecycle and chunk ingestion.
pub struct Coordinator {
    store: Arc<dyn SessionStore>,
    staging: StagingArea,
    /// Per-signature locks. Grows with the set of signatures seen, which
    /// matches the registry's no-deletion retention.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Coordinator {
    pub fn new(store: Arc<dyn SessionStore>, staging: StagingArea) -> Self {
        Self {
            store,
            staging,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Registers an unknown signature, or reports how far along a known one
    /// is. For a fully received session this re-derives the digest from the
    /// staging file on every call — the answer self-heals if the file was
    /// corrupted after assembly, at the cost of re-hashing it.
    pub async fn probe(
        &self,
        signature: &str,
        size: u64,
        chunks: u64,
    ) -> Result<ProbeOutcome, TransferError> {
        validate_signature(signature)?;
        let guard = self.lock_for(signature).await;
        let _held = guard.lock().await;

        let store = Arc::clone(&self.store);
        let staging = self.staging.clone();
        let sig = signature.to_string();

        run_blocking(move || {
            let Some(record) = store.get(&sig)? else {
                store.create(&sig, size, chunks)?;
                staging.create(&sig)?;
                tracing::info!(signature = %sig, size, chunks, "session registered");
                return Ok(ProbeOutcome::New);
            };

            if record.is_fully_received() {
                tracing::debug!(signature = %sig, "re-verifying complete session");
                return Ok(ProbeOutcome::Report(verify(&staging, &sig)?));
            }

            Ok(ProbeOutcome::Partial {
                uploaded_chunks: record.uploaded_chunks,
            })
        })
        .await
    }

    /// Appends one chunk payload to the session's staging file and advances
    /// the received-chunk counter. When the counter reaches the declared
    /// total, verification runs immediately and its report is returned in
    /// place of a plain ack.
    ///
    /// Chunks are blind-appended in arrival order — there is no chunk index,
    /// so a client must send sequentially and resend from the acknowledged
    /// count after a drop. `declared_len` must equal the payload's actual
    /// length; a disagreement rejects the chunk before any byte is written.
    pub async fn append_chunk(
        &self,
        signature: &str,
        payload: Vec<u8>,
        declared_len: u64,
    ) -> Result<AppendOutcome, TransferError> {
        validate_signature(signature)?;
        if declared_len != payload.len() as u64 {
            return Err(TransferError::SizeMismatch {
                declared: declared_len,
                actual: payload.len() as u64,
            });
        }

        let guard = self.lock_for(signature).await;
        let _held = guard.lock().await;

        let store = Arc::clone(&self.store);
        let staging = self.staging.clone();
        let sig = signature.to_string();

        run_blocking(move || {
            let record = store
                .get(&sig)?
                .ok_or_else(|| TransferError::SessionNotFound(sig.clone()))?;

            // Enforces uploaded_chunks <= chunks: a retry of the final
            // chunk after completion is rejected, not silently appended.
            if record.is_fully_received() {
                return Err(TransferError::UploadComplete(sig));
            }

            staging.append(&sig, &payload)?;
            let uploaded_chunks = store.increment_received(&sig)?;

            if uploaded_chunks == record.chunks {
                return Ok(AppendOutcome::Report(verify(&staging, &sig)?));
            }

            Ok(AppendOutcome::Accepted { uploaded_chunks })
        })
        .await
    }

    async fn lock_for(&self, signature: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(signature.to_string()).or_default())
    }
}

/// Re-derives the content signature from the staging file and compares it
/// to the claim.
fn verify(staging: &StagingArea, signature: &str) -> Result<VerifyReport, TransferError> {
    let actual = signature_of_file(&staging.path_for(signature))?;
    let verified = actual == signature;
    if verified {
        tracing::info!(signature, "upload verified");
    } else {
        tracing::warn!(
            expected = signature,
            actual = %actual,
            "assembled file does not match claimed signature"
        );
    }
    Ok(VerifyReport {
        verified,
        expected_signature: signature.to_string(),
        actual_signature: actual,
    })
}

/// Staging I/O and hashing run off the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T, TransferError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, TransferError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TransferError::Io(std::io::Error::other(e)))?
}
