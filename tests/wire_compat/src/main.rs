fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use fieldup_protocol::{ChunkFields, ChunkResponse, FileType};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  Rust:    {reserialized}"
        );
        parsed
    }

    // --- Request fields ---

    #[test]
    fn fixture_chunk_fields() {
        let fields = roundtrip_test::<ChunkFields>("chunk_fields.json");
        assert_eq!(fields.file_type, FileType::Video);
        assert!(fields.is_final());
    }

    #[test]
    fn multipart_fields_match_fixture_keys() {
        let fixture = load_fixture("chunk_fields.json");
        let fields: ChunkFields = serde_json::from_value(fixture.clone()).unwrap();

        for (key, value) in fields.text_fields() {
            let expected = match &fixture[key] {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            assert_eq!(value, expected, "multipart field {key}");
        }
    }

    // --- Responses ---

    #[test]
    fn fixture_intermediate_response() {
        let response = roundtrip_test::<ChunkResponse>("chunk_response_intermediate.json");
        assert_eq!(response.artifact_url(), None);
    }

    #[test]
    fn fixture_final_response() {
        let response = roundtrip_test::<ChunkResponse>("chunk_response_final.json");
        assert_eq!(
            response.artifact_url(),
            Some("https://assets.example.com/uploads/site-walkthrough.mp4")
        );
    }

    #[test]
    fn unknown_response_fields_are_ignored() {
        let body = read_fixture("chunk_response_extra_fields.json");
        let response = ChunkResponse::parse(body.as_bytes()).unwrap();
        assert_eq!(
            response.artifact_url(),
            Some("https://assets.example.com/uploads/floor-plan.pdf")
        );
        assert_eq!(response.message, None);
    }
}
