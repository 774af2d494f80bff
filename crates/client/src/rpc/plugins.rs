use crypstore_protocol::messages::{IdQuery, PublishedListQuery, PublishedQuery, UsernameQuery};
use crypstore_protocol::{Message, Plugin, PluginAndSource, PublishState};

use crate::client::{Reply, StoreClient};
use crate::error::ClientError;
use crate::session::Access;

impl StoreClient {
    pub async fn create_plugin(&self, plugin: Plugin) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::CreateNewPlugin(plugin),
            expect_response!(ResponsePluginModification),
        )
        .await
    }

    pub async fn update_plugin(&self, plugin: Plugin) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::UpdatePlugin(plugin),
            expect_response!(ResponsePluginModification),
        )
        .await
    }

    pub async fn delete_plugin(&self, id: i32) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::DeletePlugin(IdQuery { id }),
            expect_response!(ResponsePluginModification),
        )
        .await
    }

    pub async fn get_plugin(&self, id: i32) -> Result<Reply<Plugin>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestPlugin(IdQuery { id }),
            expect_response!(ResponsePlugin),
        )
        .await
    }

    /// Lists the plugins owned by `username`; [`ANY_OWNER`](super::ANY_OWNER) lists all.
    pub async fn get_plugin_list(&self, username: &str) -> Result<Reply<Vec<Plugin>>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestPluginList(UsernameQuery {
                username: username.into(),
            }),
            expect_response!(ResponsePluginList),
        )
        .await
    }

    /// Lists plugins with at least one source published at `min_state` or above.
    pub async fn get_published_plugin_list(
        &self,
        min_state: PublishState,
    ) -> Result<Reply<Vec<PluginAndSource>>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestPublishedPluginList(PublishedListQuery {
                publish_state: min_state,
            }),
            expect_response!(ResponsePublishedPluginList),
        )
        .await
    }

    /// Returns plugin `id` with its newest source published at `min_state` or above.
    pub async fn get_published_plugin(
        &self,
        id: i32,
        min_state: PublishState,
    ) -> Result<Reply<PluginAndSource>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestPublishedPlugin(PublishedQuery {
                id,
                publish_state: min_state,
            }),
            expect_response!(ResponsePublishedPlugin),
        )
        .await
    }
}
