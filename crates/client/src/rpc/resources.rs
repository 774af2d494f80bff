use crypstore_protocol::messages::{IdQuery, PublishedListQuery, PublishedQuery, UsernameQuery};
use crypstore_protocol::{Message, PublishState, Resource, ResourceAndResourceData};

use crate::client::{Reply, StoreClient};
use crate::error::ClientError;
use crate::session::Access;

impl StoreClient {
    pub async fn create_resource(&self, resource: Resource) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::CreateNewResource(resource),
            expect_response!(ResponseResourceModification),
        )
        .await
    }

    pub async fn update_resource(&self, resource: Resource) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::UpdateResource(resource),
            expect_response!(ResponseResourceModification),
        )
        .await
    }

    pub async fn delete_resource(&self, id: i32) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::DeleteResource(IdQuery { id }),
            expect_response!(ResponseResourceModification),
        )
        .await
    }

    pub async fn get_resource(&self, id: i32) -> Result<Reply<Resource>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestResource(IdQuery { id }),
            expect_response!(ResponseResource),
        )
        .await
    }

    pub async fn get_resource_list(
        &self,
        username: &str,
    ) -> Result<Reply<Vec<Resource>>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestResourceList(UsernameQuery {
                username: username.into(),
            }),
            expect_response!(ResponseResourceList),
        )
        .await
    }

    pub async fn get_published_resource_list(
        &self,
        min_state: PublishState,
    ) -> Result<Reply<Vec<ResourceAndResourceData>>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestPublishedResourceList(PublishedListQuery {
                publish_state: min_state,
            }),
            expect_response!(ResponsePublishedResourceList),
        )
        .await
    }

    pub async fn get_published_resource(
        &self,
        id: i32,
        min_state: PublishState,
    ) -> Result<Reply<ResourceAndResourceData>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestPublishedResource(PublishedQuery {
                id,
                publish_state: min_state,
            }),
            expect_response!(ResponsePublishedResource),
        )
        .await
    }
}
