//! Authentication API service

use crate::client::{ApiRequest, PublicClient};
use crate::error::ClientError;
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Login and registration, both reachable without a credential
#[derive(Clone)]
pub struct AuthService {
    client: PublicClient,
}

impl AuthService {
    pub fn new(client: PublicClient) -> Self {
        Self { client }
    }

    /// Exchange a username and password for tokens
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let request = ApiRequest::post("/api/auth/login").json(request)?;
        self.client.execute_any_status(&request).await
    }

    /// Create an account
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        let request = ApiRequest::post("/api/auth/register").json(request)?;
        self.client.execute_any_status(&request).await
    }
}
