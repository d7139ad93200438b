//! Friend request panel

use crate::error::ClientError;
use crate::services::FriendService;
use crate::session::Session;
use crate::types::{FriendRequest, FriendStatus, UserId, UserSummary};
use std::sync::Arc;
use tracing::{debug, warn};

pub const NO_REQUESTS: &str = "No friend requests yet.";
pub const EMPTY_QUERY: &str = "Please enter a username or email.";
pub const USER_NOT_FOUND: &str = "User not found.";
pub const REQUEST_SENT: &str = "Friend request sent!";
pub const REQUEST_NOT_SENT: &str = "Friend request already sent or failed.";

/// One rendered row of the request table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRequestRow {
    pub request_id: i64,
    pub sender_name: String,
    pub status: FriendStatus,
    /// Accept/reject controls are shown
    pub actionable: bool,
}

impl From<&FriendRequest> for FriendRequestRow {
    fn from(request: &FriendRequest) -> Self {
        Self {
            request_id: request.request_id,
            sender_name: request.sender_name(),
            status: request.status.clone(),
            actionable: request.status.is_pending(),
        }
    }
}

/// Inline, non-blocking message shown under the send form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Warning(String),
    Error(String),
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Warning(m) | Self::Error(m) => m,
        }
    }
}

pub trait FriendRequestView: Send + Sync {
    fn render_requests(&self, rows: &[FriendRequestRow]);
    fn show_placeholder(&self, text: &str);
    fn show_feedback(&self, feedback: &Feedback);
    fn clear_feedback(&self);
}

/// Lists incoming requests and sends new ones
#[derive(Clone)]
pub struct FriendRequestPanel {
    service: FriendService,
    session: Session,
    view: Arc<dyn FriendRequestView>,
}

impl FriendRequestPanel {
    pub fn new(service: FriendService, session: Session, view: Arc<dyn FriendRequestView>) -> Self {
        Self {
            service,
            session,
            view,
        }
    }

    /// Tab shown: wait for the identity, then load
    pub async fn activate(&self) -> Result<Vec<FriendRequestRow>, ClientError> {
        if self.session.wait_for_identity().await.is_none() {
            return Err(ClientError::MissingIdentity);
        }
        self.load().await
    }

    /// Fetch and render the requests addressed to the current user
    pub async fn load(&self) -> Result<Vec<FriendRequestRow>, ClientError> {
        let user_id = self.session.user_id().ok_or(ClientError::MissingIdentity)?;
        let requests = self.service.incoming(&user_id).await?;
        debug!(count = requests.len(), "Loaded friend requests");

        let rows: Vec<FriendRequestRow> = requests.iter().map(FriendRequestRow::from).collect();
        if rows.is_empty() {
            self.view.show_placeholder(NO_REQUESTS);
        } else {
            self.view.render_requests(&rows);
        }
        Ok(rows)
    }

    /// Accept a request, then reload whatever the outcome
    pub async fn accept(&self, request_id: i64) -> Result<Vec<FriendRequestRow>, ClientError> {
        if let Err(err) = self.service.accept(request_id).await {
            warn!(request_id, error = %err, "Accepting friend request failed");
        }
        self.load().await
    }

    /// Reject a request, then reload whatever the outcome
    pub async fn reject(&self, request_id: i64) -> Result<Vec<FriendRequestRow>, ClientError> {
        if let Err(err) = self.service.reject(request_id).await {
            warn!(request_id, error = %err, "Rejecting friend request failed");
        }
        self.load().await
    }

    /// Look up `query` (username or email) and send them a request
    ///
    /// Service failures become inline feedback. Only a session that ended
    /// (the client already navigated to login) or a missing identity is an
    /// error.
    pub async fn send_request(&self, query: &str) -> Result<Feedback, ClientError> {
        self.view.clear_feedback();

        let query = query.trim();
        let feedback = if query.is_empty() {
            Feedback::Error(EMPTY_QUERY.to_string())
        } else {
            let user_id = self.session.user_id().ok_or(ClientError::MissingIdentity)?;
            self.request_friendship(&user_id, query).await?
        };

        self.view.show_feedback(&feedback);
        Ok(feedback)
    }

    async fn request_friendship(
        &self,
        user_id: &UserId,
        query: &str,
    ) -> Result<Feedback, ClientError> {
        let target_id = match self.service.find_user(query).await {
            Ok(Some(UserSummary {
                user_id: Some(target_id),
                ..
            })) => target_id,
            Ok(_) => return Ok(Feedback::Error(USER_NOT_FOUND.to_string())),
            Err(err) if err.is_login_redirect() => return Err(err),
            Err(err) => {
                warn!(query, error = %err, "User lookup failed");
                return Ok(Feedback::Error(USER_NOT_FOUND.to_string()));
            }
        };

        Ok(match self.service.send(user_id, &target_id).await {
            Ok(true) => Feedback::Success(REQUEST_SENT.to_string()),
            Ok(false) => Feedback::Warning(REQUEST_NOT_SENT.to_string()),
            Err(err) if err.is_login_redirect() => return Err(err),
            Err(err) => {
                warn!(%target_id, error = %err, "Sending friend request failed");
                Feedback::Warning(REQUEST_NOT_SENT.to_string())
            }
        })
    }
}
