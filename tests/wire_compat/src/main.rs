fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and
    /// compares the JSON values. The fixtures were captured from the
    /// first-generation service, so a mismatch here means a client of that
    /// service would break against this one.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to reserialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "wire format drift in {name}: fixture (left) vs reserialized (right)"
        );
    }

    #[test]
    fn probe_request_fixture() {
        roundtrip_test::<chunkd_protocol::messages::ProbeRequest>("probe_request.json");
    }

    #[test]
    fn probe_response_fixture() {
        roundtrip_test::<chunkd_protocol::messages::ProbeResponse>("probe_response.json");
    }

    #[test]
    fn chunk_ack_fixture() {
        roundtrip_test::<chunkd_protocol::messages::ChunkAck>("chunk_ack.json");
    }

    #[test]
    fn upload_report_fixture() {
        roundtrip_test::<chunkd_protocol::messages::UploadReport>("upload_report.json");
    }

    #[test]
    fn chunk_header_fixture() {
        roundtrip_test::<chunkd_protocol::messages::ChunkHeader>("chunk_header.json");
    }

    #[test]
    fn session_record_fixture() {
        // The registry document keeps the original persisted shape.
        roundtrip_test::<chunkd_registry::SessionRecord>("session_record.json");
    }

    #[test]
    fn error_envelope_fixture() {
        roundtrip_test::<chunkd_protocol::envelope::Message>("error_envelope.json");
    }

    #[test]
    fn probe_envelope_fixture() {
        let fixture = load_fixture("probe_envelope.json");
        let msg: chunkd_protocol::envelope::Message =
            serde_json::from_value(fixture.clone()).unwrap();
        assert_eq!(msg.id, "probe-1");
        assert_eq!(msg.msg_type, chunkd_protocol::MessageType::Probe);
        let payload: chunkd_protocol::messages::ProbeRequest =
            msg.parse_payload().unwrap().unwrap();
        assert_eq!(payload.signature, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(payload.size, 1048576);
        assert_eq!(payload.chunks, 4);
    }
}
