use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum visibility a plugin source or resource data version has reached.
///
/// Ordered: a query for `Beta` also returns `Release` artifacts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum PublishState {
    #[default]
    NotPublished,
    Developer,
    Nightly,
    Beta,
    Release,
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotPublished => "NOTPUBLISHED",
            Self::Developer => "DEVELOPER",
            Self::Nightly => "NIGHTLY",
            Self::Beta => "BETA",
            Self::Release => "RELEASE",
        };
        f.write_str(name)
    }
}

/// Build pipeline state of an uploaded source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildState {
    #[default]
    Created,
    Uploaded,
    Building,
    Success,
    Error,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "CREATED",
            Self::Uploaded => "UPLOADED",
            Self::Building => "BUILDING",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A registered developer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Developer {
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub is_admin: bool,
}

/// Plugin metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Plugin {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub authornames: String,
    pub authorinstitutes: String,
    pub authoremails: String,
    /// Icon image bytes (base64 in JSON).
    #[serde(with = "base64_bytes")]
    pub icon: Vec<u8>,
}

/// One source version of a plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Source {
    pub plugin_id: i32,
    pub plugin_version: i32,
    pub build_version: i32,
    pub zip_file_name: String,
    pub build_state: BuildState,
    pub build_log: String,
    pub assembly_file_name: String,
    pub upload_date: DateTime<Utc>,
    pub build_date: DateTime<Utc>,
    pub publish_state: PublishState,
}

/// A published plugin together with the source that matched the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PluginAndSource {
    pub plugin: Plugin,
    pub source: Source,
    pub file_size: i64,
}

/// Resource metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Resource {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub description: String,
}

/// One data version of a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceData {
    pub resource_id: i32,
    pub resource_version: i32,
    pub data_filename: String,
    pub upload_date: DateTime<Utc>,
    pub publish_state: PublishState,
}

/// A published resource together with the data version that matched the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceAndResourceData {
    pub resource: Resource,
    pub resource_data: ResourceData,
    pub file_size: i64,
}

/// Serde helper for `Vec<u8>` as base64 strings.
pub(crate) mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
