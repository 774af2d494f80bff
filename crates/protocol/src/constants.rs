/// ASCII magic that opens every message header.
pub const HEADER_MAGIC: &[u8; 13] = b"CrypToolStore";

/// Size of the fixed message header: magic, type code, payload length.
pub const HEADER_SIZE: usize = HEADER_MAGIC.len() + 4 + 4;

/// Largest payload accepted from the wire (256 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

/// TCP port the store server listens on by default.
pub const DEFAULT_PORT: u16 = 15151;

macro_rules! message_types {
    ($( $(#[$meta:meta])* $name:ident = $code:literal, )*) => {
        /// Message type identifier carried in every header.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageType {
            $( $(#[$meta])* $name, )*
        }

        impl MessageType {
            /// Numeric code written to the wire.
            pub const fn code(self) -> u32 {
                match self {
                    $( Self::$name => $code, )*
                }
            }

            /// Looks up a type by its wire code.
            pub const fn from_code(code: u32) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$name), )*
                    _ => None,
                }
            }

            /// Every known message type, in code order.
            pub const ALL: &'static [MessageType] = &[$( Self::$name, )*];
        }
    };
}

message_types! {
    // Session
    Login = 0,
    ResponseLogin = 1,
    Logout = 2,

    // Developers
    RequestDeveloperList = 100,
    ResponseDeveloperList = 101,
    CreateNewDeveloper = 102,
    UpdateDeveloper = 103,
    DeleteDeveloper = 104,
    ResponseDeveloperModification = 105,
    RequestDeveloper = 106,
    ResponseDeveloper = 107,

    // Plugins
    RequestPluginList = 200,
    ResponsePluginList = 201,
    CreateNewPlugin = 202,
    UpdatePlugin = 203,
    DeletePlugin = 204,
    ResponsePluginModification = 205,
    RequestPlugin = 206,
    ResponsePlugin = 207,
    RequestPublishedPluginList = 208,
    ResponsePublishedPluginList = 209,
    RequestPublishedPlugin = 210,
    ResponsePublishedPlugin = 211,

    // Sources
    RequestSourceList = 300,
    ResponseSourceList = 301,
    CreateNewSource = 302,
    UpdateSource = 303,
    DeleteSource = 304,
    ResponseSourceModification = 305,
    RequestSource = 306,
    ResponseSource = 307,
    UpdateSourcePublishState = 308,

    // Resources
    RequestResourceList = 400,
    ResponseResourceList = 401,
    CreateNewResource = 402,
    UpdateResource = 403,
    DeleteResource = 404,
    ResponseResourceModification = 405,
    RequestResource = 406,
    ResponseResource = 407,
    RequestPublishedResourceList = 408,
    ResponsePublishedResourceList = 409,
    RequestPublishedResource = 410,
    ResponsePublishedResource = 411,

    // Resource data
    RequestResourceDataList = 500,
    ResponseResourceDataList = 501,
    CreateNewResourceData = 502,
    UpdateResourceData = 503,
    DeleteResourceData = 504,
    ResponseResourceDataModification = 505,
    RequestResourceData = 506,
    ResponseResourceData = 507,
    UpdateResourceDataPublishState = 508,

    // File transfer
    /// One chunk of file data, in either direction.
    UploadDownloadData = 600,
    /// Acknowledgement of a transfer step.
    ResponseUploadDownloadData = 601,
    StartUploadSourceZipfile = 602,
    StartUploadAssemblyZipfile = 603,
    StartUploadResourceDataFile = 604,
    RequestDownloadSourceZipfile = 605,
    RequestDownloadAssemblyZipfile = 606,
    RequestDownloadResourceDataFile = 607,
    StopUploadDownload = 608,

    // Errors
    ServerError = 900,
    ClientError = 901,
}
