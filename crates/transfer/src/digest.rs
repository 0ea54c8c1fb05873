//! Content signature derivation.
//!
//! The signature is an MD5 hex digest — it doubles as the session key a
//! client pre-computes, so the algorithm is part of the wire contract.
//! Everything that touches the algorithm lives in this module; swapping the
//! digest means changing these two functions and nothing else.

use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};

use crate::{DIGEST_BLOCK_SIZE, TransferError};

/// Computes the content signature of an in-memory byte slice.
pub fn signature_bytes(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Computes the content signature of a file by streaming it in
/// [`DIGEST_BLOCK_SIZE`] blocks.
pub fn signature_of_file(path: &Path) -> Result<String, TransferError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; DIGEST_BLOCK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
