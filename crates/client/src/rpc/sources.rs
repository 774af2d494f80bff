use crypstore_protocol::messages::{SourceListQuery, VersionQuery};
use crypstore_protocol::{BuildState, Message, PublishState, Source};

use crate::client::{Reply, StoreClient};
use crate::error::ClientError;
use crate::session::Access;

/// Selects sources by plugin, by build state, or both. At least one is required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceFilter {
    pub plugin_id: Option<i32>,
    pub build_state: Option<BuildState>,
}

impl SourceFilter {
    pub fn plugin(plugin_id: i32) -> Self {
        Self {
            plugin_id: Some(plugin_id),
            build_state: None,
        }
    }

    pub fn build_state(state: BuildState) -> Self {
        Self {
            plugin_id: None,
            build_state: Some(state),
        }
    }

    /// Wire form: `-1` and `""` stand for "any".
    fn to_query(self) -> Result<SourceListQuery, ClientError> {
        if self.plugin_id.is_none() && self.build_state.is_none() {
            return Err(ClientError::InvalidArgument(
                "No plugin or buildstate given".into(),
            ));
        }
        Ok(SourceListQuery {
            plugin_id: self.plugin_id.unwrap_or(-1),
            build_state: self
                .build_state
                .map(|s| s.to_string())
                .unwrap_or_default(),
        })
    }
}

impl StoreClient {
    pub async fn create_source(&self, source: Source) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::CreateNewSource(source),
            expect_response!(ResponseSourceModification),
        )
        .await
    }

    pub async fn update_source(&self, source: Source) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::UpdateSource(source),
            expect_response!(ResponseSourceModification),
        )
        .await
    }

    /// Moves `source` to `state`. Admin only.
    pub async fn update_source_publish_state(
        &self,
        source: &Source,
        state: PublishState,
    ) -> Result<Reply<()>, ClientError> {
        let source = Source {
            publish_state: state,
            ..source.clone()
        };
        self.call(
            Access::Admin,
            Message::UpdateSourcePublishState(source),
            expect_response!(ResponseSourceModification),
        )
        .await
    }

    pub async fn delete_source(
        &self,
        plugin_id: i32,
        version: i32,
    ) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::DeleteSource(VersionQuery {
                id: plugin_id,
                version,
            }),
            expect_response!(ResponseSourceModification),
        )
        .await
    }

    pub async fn get_source(
        &self,
        plugin_id: i32,
        version: i32,
    ) -> Result<Reply<Source>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestSource(VersionQuery {
                id: plugin_id,
                version,
            }),
            expect_response!(ResponseSource),
        )
        .await
    }

    /// Lists sources matching `filter`. An empty filter fails before anything is sent.
    pub async fn get_source_list(
        &self,
        filter: SourceFilter,
    ) -> Result<Reply<Vec<Source>>, ClientError> {
        let query = filter.to_query()?;
        self.call(
            Access::Connected,
            Message::RequestSourceList(query),
            expect_response!(ResponseSourceList),
        )
        .await
    }
}
