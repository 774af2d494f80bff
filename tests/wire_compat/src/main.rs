fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use crypstore_protocol::messages::{
        DataChunk, Empty, ListResponse, LoginRequest, SourceListQuery, StartUpload, TransferAck,
    };
    use crypstore_protocol::{
        Developer, HEADER_SIZE, Message, MessageHeader, MessageType, Plugin, PluginAndSource,
        PublishState, ResourceData, Source,
    };

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

    /// Deserializes a fixture, re-serializes it, and compares the JSON values.
    /// Returns the parsed value for further checks.
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
            "roundtrip mismatch for {name}:\n  server: {fixture}\n  client: {reserialized}"
        );
        parsed
    }

    // --- Payload fixtures ---

    #[test]
    fn fixture_developer() {
        let dev: Developer = roundtrip_test("developer.json");
        assert!(dev.is_admin);
    }

    #[test]
    fn fixture_plugin() {
        let plugin: Plugin = roundtrip_test("plugin.json");
        assert_eq!(&plugin.icon[..4], b"\x89PNG");
    }

    #[test]
    fn fixture_source() {
        let source: Source = roundtrip_test("source.json");
        assert_eq!(source.publish_state, PublishState::Beta);
        assert_eq!(source.upload_date.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn fixture_resource_data() {
        let data: ResourceData = roundtrip_test("resource_data.json");
        assert_eq!(data.publish_state, PublishState::Release);
    }

    #[test]
    fn fixture_login_request() {
        let login: LoginRequest = roundtrip_test("login_request.json");
        assert_eq!(login.username, "alice");
    }

    #[test]
    fn fixture_published_plugin_list() {
        let list: ListResponse<PluginAndSource> = roundtrip_test("published_plugin_list.json");
        assert_eq!(list.list.len(), 1);
        assert_eq!(list.list[0].file_size, 48213);
    }

    #[test]
    fn fixture_start_upload_resource_data() {
        let start: StartUpload<ResourceData> = roundtrip_test("start_upload_resource_data.json");
        assert_eq!(start.file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn fixture_source_list_query() {
        let query: SourceListQuery = roundtrip_test("source_list_query.json");
        assert_eq!(query.plugin_id, -1);
    }

    // --- Frame golden bytes ---

    #[test]
    fn stop_frame_bytes() {
        let bytes = Message::StopUploadDownload(Empty).serialize().unwrap();
        let mut expected = b"CrypToolStore".to_vec();
        expected.extend_from_slice(&[0x60, 0x02, 0x00, 0x00]);
        expected.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(bytes, expected);
        assert_eq!(bytes.len(), HEADER_SIZE);
    }

    #[test]
    fn data_chunk_frame_bytes() {
        let msg = Message::UploadDownloadData(DataChunk {
            offset: 65536,
            file_size: 65539,
            data: vec![0xAA, 0xBB, 0xCC],
        });
        let bytes = msg.serialize().unwrap();

        let mut expected = b"CrypToolStore".to_vec();
        expected.extend_from_slice(&600u32.to_le_bytes());
        expected.extend_from_slice(&19u32.to_le_bytes());
        expected.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0, 0, 0, 0]);
        expected.extend_from_slice(&[0x03, 0x00, 0x01, 0x00, 0, 0, 0, 0]);
        expected.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(bytes, expected);
        assert_eq!(Message::deserialize(&bytes).unwrap(), msg);
    }

    #[test]
    fn ack_frame_payload_is_json() {
        let bytes = Message::ResponseUploadDownloadData(TransferAck::ok())
            .serialize()
            .unwrap();
        let header = MessageHeader::decode(&bytes[..HEADER_SIZE]).unwrap();
        assert_eq!(header.message_type, MessageType::ResponseUploadDownloadData);
        assert_eq!(header.payload_len(), bytes.len() - HEADER_SIZE);

        let body: serde_json::Value = serde_json::from_slice(&bytes[HEADER_SIZE..]).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "Success": true, "Message": "OK" })
        );
    }

    #[test]
    fn message_codes_are_stable() {
        let codes = [
            (MessageType::Login, 0),
            (MessageType::Logout, 2),
            (MessageType::RequestDeveloperList, 100),
            (MessageType::RequestPluginList, 200),
            (MessageType::RequestSourceList, 300),
            (MessageType::RequestResourceList, 400),
            (MessageType::RequestResourceDataList, 500),
            (MessageType::UploadDownloadData, 600),
            (MessageType::StopUploadDownload, 608),
            (MessageType::ServerError, 900),
            (MessageType::ClientError, 901),
        ];
        for (kind, code) in codes {
            assert_eq!(kind.code(), code, "{kind:?}");
        }
    }
}
