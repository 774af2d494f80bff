use crypstore_protocol::messages::{IdQuery, VersionQuery};
use crypstore_protocol::{Message, PublishState, ResourceData};

use crate::client::{Reply, StoreClient};
use crate::error::ClientError;
use crate::session::Access;

impl StoreClient {
    pub async fn create_resource_data(&self, data: ResourceData) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::CreateNewResourceData(data),
            expect_response!(ResponseResourceDataModification),
        )
        .await
    }

    pub async fn update_resource_data(&self, data: ResourceData) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::UpdateResourceData(data),
            expect_response!(ResponseResourceDataModification),
        )
        .await
    }

    /// Moves `data` to `state`. Admin only.
    pub async fn update_resource_data_publish_state(
        &self,
        data: &ResourceData,
        state: PublishState,
    ) -> Result<Reply<()>, ClientError> {
        let data = ResourceData {
            publish_state: state,
            ..data.clone()
        };
        self.call(
            Access::Admin,
            Message::UpdateResourceDataPublishState(data),
            expect_response!(ResponseResourceDataModification),
        )
        .await
    }

    pub async fn delete_resource_data(
        &self,
        resource_id: i32,
        version: i32,
    ) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Authenticated,
            Message::DeleteResourceData(VersionQuery {
                id: resource_id,
                version,
            }),
            expect_response!(ResponseResourceDataModification),
        )
        .await
    }

    pub async fn get_resource_data(
        &self,
        resource_id: i32,
        version: i32,
    ) -> Result<Reply<ResourceData>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestResourceData(VersionQuery {
                id: resource_id,
                version,
            }),
            expect_response!(ResponseResourceData),
        )
        .await
    }

    /// Lists every data version of resource `resource_id`.
    pub async fn get_resource_data_list(
        &self,
        resource_id: i32,
    ) -> Result<Reply<Vec<ResourceData>>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestResourceDataList(IdQuery { id: resource_id }),
            expect_response!(ResponseResourceDataList),
        )
        .await
    }
}
