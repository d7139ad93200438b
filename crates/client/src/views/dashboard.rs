//! Dashboard bootstrap and tab switching

use super::chat::ChatPanel;
use super::friends::FriendRequestPanel;
use super::lock;
use crate::client::{ApiRequest, AuthenticatedClient};
use crate::error::ClientError;
use crate::navigation::Route;
use crate::session::Session;
use crate::storage::TokenStoreExt;
use crate::types::{UserId, UserSummary};
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};

pub const PROFILE_UNAVAILABLE: &str = "Session valid, but failed to load user info.";
pub const SESSION_INVALID: &str = "Session invalid. Please log in again.";
pub const VALIDATION_FAILED: &str = "Could not validate session. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Friends,
    Chat,
}

pub trait DashboardView: Send + Sync {
    fn set_content_visible(&self, visible: bool);
    fn show_loading(&self);
    fn hide_loading(&self);
    fn show_error(&self, message: &str);
    fn set_display_name(&self, name: &str);
}

/// How session bootstrap ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Identity known, content revealed
    Ready(UserId),
    /// The session validated but the profile could not be used; nothing redirects
    ProfileUnavailable,
    /// The user was sent to the login view
    RedirectedToLogin,
}

/// Top-level page: validates the session, then hosts the friend and chat tabs
pub struct Dashboard {
    client: AuthenticatedClient,
    session: Session,
    view: Arc<dyn DashboardView>,
    friends: FriendRequestPanel,
    chat: ChatPanel,
    active_tab: Mutex<Option<Tab>>,
    redirect_delay: Duration,
}

impl Dashboard {
    pub fn new(
        client: AuthenticatedClient,
        session: Session,
        view: Arc<dyn DashboardView>,
        friends: FriendRequestPanel,
        chat: ChatPanel,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            client,
            session,
            view,
            friends,
            chat,
            active_tab: Mutex::new(None),
            redirect_delay,
        }
    }

    /// Mark `tab` active without running its activation, e.g. the tab the
    /// page was opened on before the session is known
    pub fn with_active_tab(self, tab: Tab) -> Self {
        *lock(&self.active_tab) = Some(tab);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn friends(&self) -> &FriendRequestPanel {
        &self.friends
    }

    pub fn chat(&self) -> &ChatPanel {
        &self.chat
    }

    pub fn active_tab(&self) -> Option<Tab> {
        *lock(&self.active_tab)
    }

    /// Validate the stored session and load the current user's profile
    pub async fn load(&self) -> BootstrapOutcome {
        self.view.set_content_visible(false);
        self.view.show_loading();

        if self.client.store().access_token().is_none() {
            info!("No access token stored, redirecting to login");
            self.client.navigator().navigate(Route::Login);
            return BootstrapOutcome::RedirectedToLogin;
        }

        match self.client.fetch(&ApiRequest::get("/api/auth/validate")).await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("Token validation successful, fetching user info");
                self.load_profile().await
            }
            Ok(response) => {
                warn!(status = %response.status(), "Token validation failed");
                self.fail_and_redirect(SESSION_INVALID).await
            }
            // The fetch wrapper already navigated away
            Err(err) if err.is_login_redirect() => BootstrapOutcome::RedirectedToLogin,
            Err(err) => {
                error!(error = %err, "Error in token validation");
                self.fail_and_redirect(VALIDATION_FAILED).await
            }
        }
    }

    async fn load_profile(&self) -> BootstrapOutcome {
        let profile = match self.fetch_profile().await {
            Ok(profile) => profile,
            Err(err) => {
                error!(error = %err, "Failed to fetch user info");
                self.view.show_error(PROFILE_UNAVAILABLE);
                return BootstrapOutcome::ProfileUnavailable;
            }
        };

        let (user_id, display_name) = profile;
        self.session.set_user_id(user_id.clone());
        self.view.set_display_name(&display_name);

        self.view.set_content_visible(true);
        self.view.hide_loading();
        info!(%user_id, "Dashboard loaded successfully");

        self.on_identity_ready().await;
        BootstrapOutcome::Ready(user_id)
    }

    async fn fetch_profile(&self) -> Result<(UserId, String), ClientError> {
        let user: UserSummary = self.client.execute(&ApiRequest::get("/api/auth/me")).await?;
        let display_name = user.display_name().unwrap_or("User").to_string();
        let user_id = user.user_id.ok_or(ClientError::MissingIdentity)?;
        Ok((user_id, display_name))
    }

    /// Work that was waiting on the identity
    async fn on_identity_ready(&self) {
        if self.active_tab() == Some(Tab::Chat) {
            if let Err(err) = self.chat.load_contacts().await {
                warn!(error = %err, "Loading chat contacts failed");
            }
        }
    }

    async fn fail_and_redirect(&self, message: &str) -> BootstrapOutcome {
        self.view.show_error(message);
        tokio::time::sleep(self.redirect_delay).await;
        self.client.navigator().navigate(Route::Login);
        BootstrapOutcome::RedirectedToLogin
    }

    /// Switch tabs, stopping the chat refresh when the chat tab is left
    pub async fn show_tab(&self, tab: Tab) -> Result<(), ClientError> {
        let previous = lock(&self.active_tab).replace(tab);
        if previous == Some(Tab::Chat) && tab != Tab::Chat {
            self.chat.deactivate();
        }

        match tab {
            Tab::Friends => self.friends.activate().await.map(|_| ()),
            Tab::Chat => self.chat.activate().await.map(|_| ()),
        }
    }
}
