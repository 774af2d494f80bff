//! Domain operations, one file per entity.
//!
//! Every operation is a single [`StoreClient::call`](crate::StoreClient):
//! check access, send one request, map the one response.

pub mod developers;
pub mod plugins;
pub mod resource_data;
pub mod resources;
pub mod sources;

/// Username filter that matches every owner.
pub const ANY_OWNER: &str = "*";
