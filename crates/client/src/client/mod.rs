//! HTTP client for the chat service
//!
//! [`PublicClient`] talks to endpoints that need no credential (login,
//! registration, token refresh). [`AuthenticatedClient`] wraps it and attaches
//! the stored access token, refreshing it once when the server rejects it.

pub mod auth;

pub use auth::AuthenticatedClient;

use crate::config::ClientConfig;
use crate::error::ClientError;
use reqwest::{Client, ClientBuilder, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Body attached to an [`ApiRequest`]
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` pairs
    Form(Vec<(String, String)>),
}

/// Description of a request that can be sent more than once
///
/// The authenticated client needs to reissue a request after refreshing the
/// credential, so requests are kept as plain data and turned into a
/// `reqwest::RequestBuilder` per attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Send `body` as JSON
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Send the pairs as a URL-encoded form
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.body = RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// Client for endpoints that don't require authentication
#[derive(Clone)]
pub struct PublicClient {
    client: Client,
    base_url: String,
}

impl PublicClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }
        let base_url = config.base_url.trim_end_matches('/').to_string();

        #[cfg(not(target_arch = "wasm32"))]
        let client = {
            let mut builder = ClientBuilder::new().user_agent(config.user_agent.clone());
            if let Some(timeout) = config.request_timeout() {
                builder = builder.timeout(timeout);
            }
            builder.build()?
        };

        #[cfg(target_arch = "wasm32")]
        let client = ClientBuilder::new()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a `reqwest` request for one attempt
    pub fn request(&self, request: &ApiRequest) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        }
    }

    /// Send a request without any credential
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        debug!(method = %request.method, path = %request.path, "Sending public request");
        Ok(self.request(request).send().await?)
    }

    /// Send a request and decode a successful JSON response
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ClientError> {
        read_json(self.send(request).await?).await
    }

    /// Send a request and decode the JSON body whatever the status
    ///
    /// The login and registration endpoints report failures as
    /// `{"error": ...}` bodies. Only a body that fails to decode is turned
    /// into a status error.
    pub async fn execute_any_status<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str(&text) {
            Ok(body) => Ok(body),
            Err(_) if !status.is_success() => Err(ClientError::from_status(status, text)),
            Err(err) => Err(err.into()),
        }
    }
}

/// Decode a successful JSON response, mapping error statuses to [`ClientError`]
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(ClientError::from_status(status, message))
    }
}

/// Decode a JSON response that may legitimately be empty or `null`
pub async fn read_optional_json<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>, ClientError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::from_status(status, text));
    }

    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

/// Check the status of a response whose body is not needed
pub async fn expect_success(response: Response) -> Result<(), ClientError> {
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(ClientError::from_status(status, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_base_url() {
        let config = ClientConfig::new("  ");
        assert!(matches!(
            PublicClient::new(&config),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn trims_trailing_slash() {
        let client = PublicClient::new(&ClientConfig::new("http://localhost:8080/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn form_values_are_stringified() {
        let request = ApiRequest::post("/api/friend-requests/accept").form([("requestId", 12)]);
        assert_eq!(
            request.body(),
            &RequestBody::Form(vec![("requestId".to_string(), "12".to_string())])
        );
    }
}
