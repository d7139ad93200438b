//! Authenticated requests with a single refresh-and-retry

use super::{ApiRequest, PublicClient, expect_success, read_json, read_optional_json};
use crate::error::ClientError;
use crate::navigation::{Navigator, Route};
use crate::storage::{TokenStore, TokenStoreExt};
use crate::types::{RefreshRequest, RefreshResponse};
use reqwest::{Response, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

const REFRESH_PATH: &str = "/api/auth/refresh";

/// Client that sends the stored access token with every request
///
/// When the server answers `401 Unauthorized` the client exchanges the stored
/// refresh token for a new access token and reissues the request exactly once.
/// If there is no refresh token or the exchange fails, the navigator is sent
/// to the login view and the call fails with [`ClientError::LoginRequired`].
#[derive(Clone)]
pub struct AuthenticatedClient {
    public: PublicClient,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthenticatedClient {
    pub fn new(
        public: PublicClient,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            public,
            store,
            navigator,
        }
    }

    /// The unauthenticated client this one wraps
    pub fn public(&self) -> &PublicClient {
        &self.public
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    fn authorize(&self, request: &ApiRequest, token: Option<&str>) -> reqwest::RequestBuilder {
        let builder = self
            .public
            .request(request)
            .header(header::ACCEPT, "application/json");

        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request with the stored credential, refreshing it at most once
    ///
    /// The returned response is the retry's when a refresh happened. Status
    /// codes other than 401 are handed back untouched.
    pub async fn fetch(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let token = self.store.access_token();
        debug!(method = %request.method(), path = request.path(), "Making API call");

        let response = self.authorize(request, token.as_deref()).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!(path = request.path(), "Received 401, attempting token refresh");
        let Some(refresh_token) = self.store.refresh_token() else {
            return Err(self.redirect_to_login("no refresh token stored"));
        };

        let refreshed = match self.refresh(refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                return Err(self.redirect_to_login("token refresh was rejected"));
            }
        };

        self.store
            .store_tokens(&refreshed.access_token, refreshed.refresh_token.as_deref())?;
        info!(
            rotated = refreshed.refresh_token.is_some(),
            "Token refresh successful, retrying original request"
        );

        Ok(self
            .authorize(request, Some(&refreshed.access_token))
            .send()
            .await?)
    }

    async fn refresh(&self, refresh_token: String) -> Result<RefreshResponse, ClientError> {
        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest { refresh_token })?;
        self.public.execute(&request).await
    }

    fn redirect_to_login(&self, reason: &str) -> ClientError {
        warn!(reason, "Redirecting to login");
        self.navigator.navigate(Route::Login);
        ClientError::LoginRequired(reason.to_string())
    }

    /// Fetch and decode a successful JSON response
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ClientError> {
        read_json(self.fetch(request).await?).await
    }

    /// Fetch a JSON response that may be empty
    pub async fn execute_optional<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Option<T>, ClientError> {
        read_optional_json(self.fetch(request).await?).await
    }

    /// Fetch and only check the status
    pub async fn execute_unit(&self, request: &ApiRequest) -> Result<(), ClientError> {
        expect_success(self.fetch(request).await?).await
    }
}
