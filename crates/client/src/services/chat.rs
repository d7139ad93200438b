//! Contacts and messages API service

use crate::client::{ApiRequest, AuthenticatedClient};
use crate::error::ClientError;
use crate::types::{ChatMessage, Contact, UserId, UserSummary};
use reqwest::StatusCode;
use tracing::debug;

#[derive(Clone)]
pub struct ChatService {
    client: AuthenticatedClient,
}

impl ChatService {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Accepted friends of `user_id`
    ///
    /// Entries without an id cannot be chatted with and are skipped.
    pub async fn contacts(&self, user_id: &UserId) -> Result<Vec<Contact>, ClientError> {
        let request = ApiRequest::get(format!("/api/friends/list/{user_id}"));
        let users: Vec<UserSummary> = self.client.execute(&request).await?;

        Ok(users
            .into_iter()
            .filter_map(|user| match Contact::try_from(user) {
                Ok(contact) => Some(contact),
                Err(user) => {
                    debug!(?user, "Skipping contact without an id");
                    None
                }
            })
            .collect())
    }

    /// Conversation between `user_id` and `contact_id`, oldest first
    pub async fn messages(
        &self,
        user_id: &UserId,
        contact_id: &UserId,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        let request = ApiRequest::get(format!("/api/messages/{user_id}/{contact_id}"));
        self.client.execute(&request).await
    }

    /// Post a message; the status is returned as-is, only transport errors fail
    pub async fn send(
        &self,
        from: &UserId,
        to: &UserId,
        content: &str,
    ) -> Result<StatusCode, ClientError> {
        let request = ApiRequest::post("/api/messages/send").form([
            ("fromUserId", from.to_string()),
            ("toUserId", to.to_string()),
            ("content", content.to_string()),
        ]);
        let response = self.client.fetch(&request).await?;
        Ok(response.status())
    }
}
