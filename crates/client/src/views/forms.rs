//! Login and registration forms, and logout

use crate::error::ClientError;
use crate::navigation::{Navigator, Route};
use crate::services::AuthService;
use crate::storage::{TokenStore, TokenStoreExt};
use crate::types::{LoginRequest, RegisterRequest};
use std::sync::Arc;
use tracing::info;

pub const UNKNOWN_ERROR: &str = "Unknown error occurred.";

pub trait FormView: Send + Sync {
    fn show_success(&self, message: &str);
    fn show_error(&self, message: &str);
}

pub struct LoginForm {
    auth: AuthService,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    view: Arc<dyn FormView>,
}

impl LoginForm {
    pub fn new(
        auth: AuthService,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        view: Arc<dyn FormView>,
    ) -> Self {
        Self {
            auth,
            store,
            navigator,
            view,
        }
    }

    /// Log in; on success the tokens are stored and the dashboard opened
    ///
    /// Returns whether the login succeeded. Rejections are shown inline.
    pub async fn submit(&self, username: &str, password_hash: &str) -> Result<bool, ClientError> {
        let request = LoginRequest {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        let response = self.auth.login(&request).await?;

        if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) {
            self.store
                .store_tokens(token, response.refresh_token.as_deref())?;
            info!(username, "Logged in");
            self.navigator.navigate(Route::Dashboard);
            return Ok(true);
        }

        match response.error {
            Some(error) => self.view.show_error(&error),
            None => self.view.show_error(UNKNOWN_ERROR),
        }
        Ok(false)
    }
}

pub struct RegisterForm {
    auth: AuthService,
    view: Arc<dyn FormView>,
}

impl RegisterForm {
    pub fn new(auth: AuthService, view: Arc<dyn FormView>) -> Self {
        Self { auth, view }
    }

    /// Create an account; returns whether the service confirmed it
    pub async fn submit(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, ClientError> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        let response = self.auth.register(&request).await?;

        if let Some(message) = response.message {
            self.view.show_success(&message);
            Ok(true)
        } else {
            self.view
                .show_error(response.error.as_deref().unwrap_or(UNKNOWN_ERROR));
            Ok(false)
        }
    }
}

/// Forget both tokens and go to the login view
pub fn logout(store: &dyn TokenStore, navigator: &dyn Navigator) -> Result<(), ClientError> {
    info!("Logging out");
    store.clear_tokens()?;
    navigator.navigate(Route::Login);
    Ok(())
}
