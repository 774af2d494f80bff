use crypstore_protocol::messages::{Empty, UsernameQuery};
use crypstore_protocol::{Developer, Message};

use crate::client::{Reply, StoreClient};
use crate::error::ClientError;
use crate::session::Access;

impl StoreClient {
    /// Registers a developer account. Admin only.
    pub async fn create_developer(&self, developer: Developer) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Admin,
            Message::CreateNewDeveloper(developer),
            expect_response!(ResponseDeveloperModification),
        )
        .await
    }

    /// Updates a developer. The server decides whether the caller may change it.
    pub async fn update_developer(&self, developer: Developer) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Connected,
            Message::UpdateDeveloper(developer),
            expect_response!(ResponseDeveloperModification),
        )
        .await
    }

    pub async fn delete_developer(&self, username: &str) -> Result<Reply<()>, ClientError> {
        self.call(
            Access::Admin,
            Message::DeleteDeveloper(UsernameQuery {
                username: username.into(),
            }),
            expect_response!(ResponseDeveloperModification),
        )
        .await
    }

    pub async fn get_developer(&self, username: &str) -> Result<Reply<Developer>, ClientError> {
        self.call(
            Access::Connected,
            Message::RequestDeveloper(UsernameQuery {
                username: username.into(),
            }),
            expect_response!(ResponseDeveloper),
        )
        .await
    }

    pub async fn get_developer_list(&self) -> Result<Reply<Vec<Developer>>, ClientError> {
        self.call(
            Access::Admin,
            Message::RequestDeveloperList(Empty),
            expect_response!(ResponseDeveloperList),
        )
        .await
    }
}
