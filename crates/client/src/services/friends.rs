//! Friend request API service

use crate::client::{ApiRequest, AuthenticatedClient};
use crate::error::ClientError;
use crate::types::{FriendRequest, UserId, UserSummary, is_truthy};
use tracing::debug;

/// Friend requests and user lookup
#[derive(Clone)]
pub struct FriendService {
    client: AuthenticatedClient,
}

impl FriendService {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Requests addressed to `user_id`
    ///
    /// Entries that don't decode (e.g. without a `requestId`) cannot be acted
    /// on and are skipped.
    pub async fn incoming(&self, user_id: &UserId) -> Result<Vec<FriendRequest>, ClientError> {
        let request = ApiRequest::get(format!("/api/friend-requests/{user_id}"));
        let entries: Vec<serde_json::Value> = self.client.execute(&request).await?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<FriendRequest>(entry.clone()) {
                Ok(request) => Some(request),
                Err(err) => {
                    debug!(%entry, error = %err, "Skipping malformed friend request");
                    None
                }
            })
            .collect())
    }

    pub async fn accept(&self, request_id: i64) -> Result<(), ClientError> {
        let request = ApiRequest::post("/api/friend-requests/accept").form([("requestId", request_id)]);
        self.client.execute_unit(&request).await
    }

    pub async fn reject(&self, request_id: i64) -> Result<(), ClientError> {
        let request = ApiRequest::post("/api/friend-requests/reject").form([("requestId", request_id)]);
        self.client.execute_unit(&request).await
    }

    /// Look a user up by username or email
    ///
    /// An empty body, `null`, or a record without an id all mean "no match".
    pub async fn find_user(&self, query: &str) -> Result<Option<UserSummary>, ClientError> {
        let request = ApiRequest::get("/api/users/find").query("query", query);
        let user: Option<UserSummary> = self.client.execute_optional(&request).await?;
        Ok(user.filter(|u| u.user_id.is_some()))
    }

    /// Send a request from `from` to `to`; `false` means it already existed or was refused
    pub async fn send(&self, from: &UserId, to: &UserId) -> Result<bool, ClientError> {
        let request = ApiRequest::post("/api/friend-requests/send")
            .form([("fromUserId", from), ("toUserId", to)]);
        let accepted: Option<serde_json::Value> = self.client.execute_optional(&request).await?;
        Ok(accepted.as_ref().is_some_and(is_truthy))
    }
}
