//! Network side of authentication. `SessionManager` only talks to the
//! backend through this trait.

use async_trait::async_trait;

use super::models::{
    AuthUser, GoogleIdTokenPayload, LineLoginResponse, LineTokenRequest, LoginCredentials,
    LoginResponse,
};
use crate::api::client::{ApiClient, RequestOptions};
use crate::api::endpoints;
use crate::common::ApiClientError;

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiClientError>;

    /// `POST /auth/google`
    async fn login_with_google(&self, id_token: &str) -> Result<LoginResponse, ApiClientError>;

    /// `POST /auth/line/token`
    async fn exchange_line_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<LineLoginResponse, ApiClientError>;

    /// `GET /auth/current_user`, authenticated with the stored token
    async fn current_user(&self) -> Result<AuthUser, ApiClientError>;
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiClientError> {
        self.post(endpoints::auth::LOGIN, credentials, RequestOptions::skip_auth())
            .await
    }

    async fn login_with_google(&self, id_token: &str) -> Result<LoginResponse, ApiClientError> {
        let payload = GoogleIdTokenPayload {
            id_token: id_token.to_string(),
        };
        self.post(endpoints::auth::GOOGLE, &payload, RequestOptions::skip_auth())
            .await
    }

    async fn exchange_line_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<LineLoginResponse, ApiClientError> {
        let payload = LineTokenRequest {
            code: code.to_string(),
            redirect_uri: redirect_uri.to_string(),
        };
        self.post(endpoints::auth::LINE_TOKEN, &payload, RequestOptions::skip_auth())
            .await
    }

    async fn current_user(&self) -> Result<AuthUser, ApiClientError> {
        self.get(endpoints::auth::CURRENT_USER, RequestOptions::no_retry())
            .await
    }
}
