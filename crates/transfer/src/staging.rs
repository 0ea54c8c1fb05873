//! Staging files: one append-only file per signature.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::TransferError;

/// Validates a content signature before it is used as a file name.
///
/// Exactly 32 lowercase hex characters — an MD5 hex digest. Anything else
/// (path separators, `..`, uppercase, wrong length) is rejected before it
/// can reach a path join. Uppercase is rejected rather than folded because
/// verification compares hex strings byte-for-byte.
pub fn validate_signature(signature: &str) -> Result<(), TransferError> {
    let valid = signature.len() == 32
        && signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !valid {
        return Err(TransferError::InvalidSignature(signature.to_string()));
    }
    Ok(())
}

/// Directory of staging files accumulating appended chunks, one file per
/// signature, named by the signature itself.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Opens a staging area rooted at `dir`, creating the directory if
    /// absent.
    pub fn open(dir: &Path) -> Result<Self, TransferError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the staging file for a signature.
    ///
    /// Callers must have run [`validate_signature`] first.
    pub fn path_for(&self, signature: &str) -> PathBuf {
        self.dir.join(signature)
    }

    /// Creates (truncating) the staging file for a new session.
    ///
    /// The only point in a session's life where the file is truncated.
    pub fn create(&self, signature: &str) -> Result<(), TransferError> {
        std::fs::File::create(self.path_for(signature))?;
        Ok(())
    }

    /// Appends a chunk payload to the end of the staging file and returns
    /// the file's new byte length.
    ///
    /// The file is opened for append only — never random-access rewrite —
    /// so the file's length is always the sum of applied payload lengths.
    pub fn append(&self, signature: &str, payload: &[u8]) -> Result<u64, TransferError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(signature))?;
        file.write_all(payload)?;
        Ok(file.metadata()?.len())
    }

    /// Current byte length of the staging file (0 if it does not exist yet).
    pub fn len(&self, signature: &str) -> Result<u64, TransferError> {
        match std::fs::metadata(self.path_for(signature)) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
