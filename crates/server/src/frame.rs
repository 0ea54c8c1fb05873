//! Binary chunk frame: 4-byte big-endian header length + JSON header + raw payload.
//!
//! Chunk bytes ride in the same frame as their header, so they are never
//! base64-inflated through the JSON envelope.

use chunkd_protocol::messages::ChunkHeader;

/// Errors from chunk frame parsing.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame too short (need at least 4 bytes)")]
    TooShort,

    #[error("header truncated: expected {expected} bytes, got {got}")]
    HeaderTruncated { expected: usize, got: usize },

    #[error("invalid header JSON: {0}")]
    InvalidHeader(String),
}

/// Parses a raw binary frame into its header and chunk payload.
///
/// Wire format: `[4 bytes: header_len (big-endian)][header_len bytes: JSON][rest: payload]`
pub fn parse_chunk_frame(data: &[u8]) -> Result<(ChunkHeader, Vec<u8>), FrameError> {
    if data.len() < 4 {
        return Err(FrameError::TooShort);
    }

    let header_len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < 4 + header_len {
        return Err(FrameError::HeaderTruncated {
            expected: header_len,
            got: data.len() - 4,
        });
    }

    let header: ChunkHeader = serde_json::from_slice(&data[4..4 + header_len])
        .map_err(|e| FrameError::InvalidHeader(e.to_string()))?;
    let payload = data[4 + header_len..].to_vec();

    Ok((header, payload))
}

/// Encodes a chunk frame for sending.
pub fn encode_chunk_frame(header: &ChunkHeader, payload: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
    let header_json = serde_json::to_vec(header)?;
    let header_len = header_json.len() as u32;

    let mut buf = Vec::with_capacity(4 + header_json.len() + payload.len());
    buf.extend_from_slice(&header_len.to_be_bytes());
    buf.extend_from_slice(&header_json);
    buf.extend_from_slice(payload);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIG: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    fn make_frame(header: &[u8], payload: &[u8]) -> Vec<u8> {
        let len = header.len() as u32;
        let mut buf = Vec::new();
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(header);
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn parse_valid_frame() {
        let header = serde_json::to_vec(&serde_json::json!({
            "id": "c-1",
            "signature": SIG,
            "size": 16
        }))
        .unwrap();
        let payload = b"sixteen bytes!!!";

        let (parsed, data) = parse_chunk_frame(&make_frame(&header, payload)).unwrap();
        assert_eq!(parsed.id, "c-1");
        assert_eq!(parsed.signature, SIG);
        assert_eq!(parsed.size, 16);
        assert_eq!(data, payload);
    }

    #[test]
    fn parse_too_short() {
        assert!(matches!(
            parse_chunk_frame(&[0, 0, 0]),
            Err(FrameError::TooShort)
        ));
    }

    #[test]
    fn parse_header_truncated() {
        // Header claims 64 bytes but only 5 follow.
        let data = [0, 0, 0, 64, 1, 2, 3, 4, 5];
        assert!(matches!(
            parse_chunk_frame(&data),
            Err(FrameError::HeaderTruncated { expected: 64, got: 5 })
        ));
    }

    #[test]
    fn parse_invalid_header_json() {
        let frame = make_frame(b"not json at all", b"payload");
        assert!(matches!(
            parse_chunk_frame(&frame),
            Err(FrameError::InvalidHeader(_))
        ));
    }

    #[test]
    fn encode_parse_roundtrip() {
        let header = ChunkHeader {
            id: "c-9".into(),
            signature: SIG.into(),
            size: 14,
        };
        let payload = b"roundtrip data";

        let encoded = encode_chunk_frame(&header, payload).unwrap();
        let (parsed, data) = parse_chunk_frame(&encoded).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(data, payload);
    }

    #[test]
    fn empty_payload_frame() {
        let header = ChunkHeader {
            id: "c-0".into(),
            signature: SIG.into(),
            size: 0,
        };
        let encoded = encode_chunk_frame(&header, b"").unwrap();
        let (_, data) = parse_chunk_frame(&encoded).unwrap();
        assert!(data.is_empty());
    }
}
