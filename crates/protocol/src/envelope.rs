use crate::constants::{HEADER_SIZE, MAX_PAYLOAD_SIZE, MessageType};
use crate::error::ProtocolError;
use crate::header::MessageHeader;
use crate::messages::{
    DataChunk, DownloadRequest, Empty, EntityResponse, ErrorReport, IdQuery, ListResponse,
    LoginRequest, LoginResponse, LogoutRequest, ModificationResponse, Payload, PublishedListQuery,
    PublishedQuery, SourceListQuery, StartUpload, TransferAck, UsernameQuery, VersionQuery,
};
use crate::types::{
    Developer, Plugin, PluginAndSource, Resource, ResourceAndResourceData, ResourceData, Source,
};

macro_rules! message_enum {
    ($( $kind:ident($body:ty), )*) => {
        /// One protocol message: the variant names its type, the field is its body.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Message {
            $( $kind($body), )*
        }

        impl Message {
            /// Type code carried in the header.
            pub fn message_type(&self) -> MessageType {
                match self {
                    $( Self::$kind(_) => MessageType::$kind, )*
                }
            }

            fn encode_body(&self) -> Result<Vec<u8>, ProtocolError> {
                match self {
                    $( Self::$kind(body) => body.encode(), )*
                }
            }

            /// Decodes a payload whose type is already known from its header.
            pub fn decode_body(kind: MessageType, payload: &[u8]) -> Result<Self, ProtocolError> {
                match kind {
                    $( MessageType::$kind => Ok(Self::$kind(<$body as Payload>::decode(kind, payload)?)), )*
                }
            }
        }
    };
}

message_enum! {
    Login(LoginRequest),
    ResponseLogin(LoginResponse),
    Logout(LogoutRequest),

    RequestDeveloperList(Empty),
    ResponseDeveloperList(ListResponse<Developer>),
    CreateNewDeveloper(Developer),
    UpdateDeveloper(Developer),
    DeleteDeveloper(UsernameQuery),
    ResponseDeveloperModification(ModificationResponse),
    RequestDeveloper(UsernameQuery),
    ResponseDeveloper(EntityResponse<Developer>),

    RequestPluginList(UsernameQuery),
    ResponsePluginList(ListResponse<Plugin>),
    CreateNewPlugin(Plugin),
    UpdatePlugin(Plugin),
    DeletePlugin(IdQuery),
    ResponsePluginModification(ModificationResponse),
    RequestPlugin(IdQuery),
    ResponsePlugin(EntityResponse<Plugin>),
    RequestPublishedPluginList(PublishedListQuery),
    ResponsePublishedPluginList(ListResponse<PluginAndSource>),
    RequestPublishedPlugin(PublishedQuery),
    ResponsePublishedPlugin(EntityResponse<PluginAndSource>),

    RequestSourceList(SourceListQuery),
    ResponseSourceList(ListResponse<Source>),
    CreateNewSource(Source),
    UpdateSource(Source),
    DeleteSource(VersionQuery),
    ResponseSourceModification(ModificationResponse),
    RequestSource(VersionQuery),
    ResponseSource(EntityResponse<Source>),
    UpdateSourcePublishState(Source),

    RequestResourceList(UsernameQuery),
    ResponseResourceList(ListResponse<Resource>),
    CreateNewResource(Resource),
    UpdateResource(Resource),
    DeleteResource(IdQuery),
    ResponseResourceModification(ModificationResponse),
    RequestResource(IdQuery),
    ResponseResource(EntityResponse<Resource>),
    RequestPublishedResourceList(PublishedListQuery),
    ResponsePublishedResourceList(ListResponse<ResourceAndResourceData>),
    RequestPublishedResource(PublishedQuery),
    ResponsePublishedResource(EntityResponse<ResourceAndResourceData>),

    RequestResourceDataList(IdQuery),
    ResponseResourceDataList(ListResponse<ResourceData>),
    CreateNewResourceData(ResourceData),
    UpdateResourceData(ResourceData),
    DeleteResourceData(VersionQuery),
    ResponseResourceDataModification(ModificationResponse),
    RequestResourceData(VersionQuery),
    ResponseResourceData(EntityResponse<ResourceData>),
    UpdateResourceDataPublishState(ResourceData),

    UploadDownloadData(DataChunk),
    ResponseUploadDownloadData(TransferAck),
    StartUploadSourceZipfile(StartUpload<Source>),
    StartUploadAssemblyZipfile(StartUpload<Source>),
    StartUploadResourceDataFile(StartUpload<ResourceData>),
    RequestDownloadSourceZipfile(DownloadRequest<Source>),
    RequestDownloadAssemblyZipfile(DownloadRequest<Source>),
    RequestDownloadResourceDataFile(DownloadRequest<ResourceData>),
    StopUploadDownload(Empty),

    ServerError(ErrorReport),
    ClientError(ErrorReport),
}

impl Message {
    /// Encodes header and payload into one buffer ready for the wire.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        let payload = self.encode_body()?;
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let header = MessageHeader::new(self.message_type(), payload.len() as u32);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&header.encode());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decodes one complete message (header followed by exactly its payload).
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let header = MessageHeader::decode(bytes)?;
        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != header.payload_len() {
            return Err(ProtocolError::LengthMismatch {
                declared: header.payload_len(),
                actual: payload.len(),
            });
        }
        Self::decode_body(header.message_type, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_a_variant() {
        // decode_body matches exhaustively on MessageType; this checks the
        // variant it produces carries the same type back.
        let ack = Message::ResponseUploadDownloadData(TransferAck::ok());
        assert_eq!(ack.message_type(), MessageType::ResponseUploadDownloadData);
        let stop = Message::StopUploadDownload(Empty);
        assert_eq!(stop.message_type(), MessageType::StopUploadDownload);
    }

    #[test]
    fn serialize_prefixes_header() {
        let msg = Message::ServerError(ErrorReport {
            message: "boom".into(),
        });
        let bytes = msg.serialize().unwrap();
        let header = MessageHeader::decode(&bytes).unwrap();
        assert_eq!(header.message_type, MessageType::ServerError);
        assert_eq!(header.payload_len(), bytes.len() - HEADER_SIZE);
        assert_eq!(Message::deserialize(&bytes).unwrap(), msg);
    }

    #[test]
    fn bodiless_message_has_empty_payload() {
        let bytes = Message::RequestDeveloperList(Empty).serialize().unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(
            Message::deserialize(&bytes).unwrap(),
            Message::RequestDeveloperList(Empty)
        );
    }

    #[test]
    fn deserialize_rejects_trailing_bytes() {
        let mut bytes = Message::StopUploadDownload(Empty).serialize().unwrap();
        bytes.push(0);
        assert!(matches!(
            Message::deserialize(&bytes),
            Err(ProtocolError::LengthMismatch {
                declared: 0,
                actual: 1
            })
        ));
    }

    #[test]
    fn chunk_message_roundtrip() {
        let msg = Message::UploadDownloadData(DataChunk {
            offset: 4,
            file_size: 4,
            data: vec![1, 2, 3, 4],
        });
        let bytes = msg.serialize().unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 16 + 4);
        assert_eq!(Message::deserialize(&bytes).unwrap(), msg);
    }

    #[test]
    fn source_list_query_payload() {
        let msg = Message::RequestSourceList(SourceListQuery {
            plugin_id: 12,
            build_state: String::new(),
        });
        let bytes = msg.serialize().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes[HEADER_SIZE..]).unwrap();
        assert_eq!(json["PluginId"], 12);
        assert_eq!(json["BuildState"], "");
    }
}
