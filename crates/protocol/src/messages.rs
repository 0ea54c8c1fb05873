//! Typed payloads for each message type.
//!
//! Field names are snake_case on the wire — they mirror the JSON the
//! first-generation service exposed (`size`, `chunks`, `uploaded_chunks`,
//! `expected_signature`), so existing clients port without a field-name
//! audit. The `tests/wire_compat` fixtures pin this.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests (client -> server)
// ---------------------------------------------------------------------------

/// Registers an upload, or asks how much of an existing one was received.
///
/// `signature` is the MD5 hex digest of the final file — both the upload's
/// identity and its integrity proof. `size` is the declared total byte
/// length, `chunks` the number of chunks the client intends to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRequest {
    pub signature: String,
    pub size: u64,
    pub chunks: u64,
}

/// Header of a binary chunk frame.
///
/// The chunk bytes themselves ride behind this header in the same frame
/// (never base64-inflated into JSON). `size` is the declared payload length;
/// the server rejects the chunk if it disagrees with the bytes actually
/// delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkHeader {
    pub id: String,
    pub signature: String,
    pub size: u64,
}

// ---------------------------------------------------------------------------
// Responses (server -> client)
// ---------------------------------------------------------------------------

/// Answer to a probe of an upload that is not yet fully received.
///
/// `exists: false` means the session was registered by this probe;
/// `uploaded_chunks` is the resume point — the client skips that many
/// chunks from the front of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub exists: bool,
    pub uploaded_chunks: u64,
}

/// Acknowledgment of one accepted chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkAck {
    pub complete: bool,
    pub uploaded_chunks: u64,
}

/// Verification verdict for a fully received upload.
///
/// `signature` is the digest derived from the assembled staging file,
/// `expected_signature` the client's original claim. On corruption both are
/// surfaced so the client can diagnose out-of-band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReport {
    pub verified: bool,
    pub signature: String,
    pub expected_signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_request_wire_field_names() {
        let req = ProbeRequest {
            signature: "5eb63bbbe01eeed093cb22bb8f5acdc3".into(),
            size: 25,
            chunks: 2,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["signature"], "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(json["size"], 25);
        assert_eq!(json["chunks"], 2);
    }

    #[test]
    fn probe_response_uses_uploaded_chunks_key() {
        let resp = ProbeResponse {
            exists: true,
            uploaded_chunks: 7,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"uploaded_chunks\":7"));
    }

    #[test]
    fn upload_report_surfaces_both_digests() {
        let report = UploadReport {
            verified: false,
            signature: "acbd18db4cc2f85cedef654fccc4a4d8".into(),
            expected_signature: "5eb63bbbe01eeed093cb22bb8f5acdc3".into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["verified"], false);
        assert_eq!(json["signature"], "acbd18db4cc2f85cedef654fccc4a4d8");
        assert_eq!(
            json["expected_signature"],
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn chunk_header_roundtrip() {
        let header = ChunkHeader {
            id: "c-12".into(),
            signature: "5eb63bbbe01eeed093cb22bb8f5acdc3".into(),
            size: 4_194_304,
        };
        let json = serde_json::to_string(&header).unwrap();
        let parsed: ChunkHeader = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn chunk_ack_roundtrip() {
        let ack = ChunkAck {
            complete: false,
            uploaded_chunks: 1,
        };
        let json = serde_json::to_string(&ack).unwrap();
        let parsed: ChunkAck = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ack);
    }
}
