// src/api/client.rs
//
// HTTP client for the TalkToLead backend. Attaches the bearer token from the
// credential store, maps failures to `ApiClientError`, clears the token on
// 401 and retries idempotent GETs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::auth::credentials::CredentialStore;
use crate::common::{safe_token_log, ApiClientError, AppConfig};

/// Invoked after a 401 has cleared the stored token; the caller should send
/// the user back to the login view.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Exponential backoff: `base_delay * 2^attempt`, capped at `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Do not attach the bearer token
    pub skip_auth: bool,
    /// Disable the GET retry policy for this call
    pub no_retry: bool,
}

impl RequestOptions {
    pub fn skip_auth() -> Self {
        Self {
            skip_auth: true,
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            no_retry: true,
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: CredentialStore,
    retry: RetryPolicy,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &AppConfig, credentials: CredentialStore) -> Result<Self, ApiClientError> {
        let http = Client::builder()
            .no_proxy()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                ..RetryPolicy::default()
            },
            on_unauthorized: None,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_unauthorized_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Convenience methods
    // ------------------------------------------------------------------------

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiClientError> {
        let mut attempt = 0;
        loop {
            match self
                .send::<T, ()>(Method::GET, endpoint, None, options)
                .await
            {
                Ok(value) => return Ok(value),
                Err(e)
                    if !options.no_retry
                        && e.is_retryable()
                        && attempt < self.retry.max_retries =>
                {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        endpoint = %endpoint,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "GET failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn post<T, B>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, endpoint, Some(body), options).await
    }

    pub async fn put<T, B>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, endpoint, Some(body), options).await
    }

    pub async fn patch<T, B>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PATCH, endpoint, Some(body), options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiClientError> {
        self.send::<T, ()>(Method::DELETE, endpoint, None, options)
            .await
    }

    // ------------------------------------------------------------------------
    // Core request path
    // ------------------------------------------------------------------------

    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }

    async fn send<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url_for(endpoint);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if !options.skip_auth {
            match self.credentials.token() {
                Ok(Some(token)) => {
                    debug!(token = %safe_token_log(&token), "Attaching bearer token");
                    request = request.bearer_auth(token);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Failed to read auth token, sending unauthenticated"),
            }
        }

        if let Some(body) = body {
            if method != Method::GET {
                request = request.json(body);
            }
        }

        debug!(method = %method, url = %url, "Sending API request");

        let response = request.send().await.map_err(|e| {
            error!(error = %e, method = %method, url = %url, "HTTP error contacting backend");
            ApiClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| ct.contains("application/json"));

        if !status.is_success() {
            let err = error_from_response(status, is_json, response).await;
            warn!(
                http_status = %status,
                method = %method,
                url = %url,
                code = ?err.code(),
                "Backend returned error status"
            );

            if status == StatusCode::UNAUTHORIZED {
                self.handle_unauthorized();
            }
            return Err(err);
        }

        if status == StatusCode::NO_CONTENT || !is_json {
            return Ok(serde_json::from_value(Value::Object(Map::new()))?);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn handle_unauthorized(&self) {
        if let Err(e) = self.credentials.clear_token() {
            error!(error = %e, "Failed to clear auth token after 401");
        }
        warn!("Received 401, stored auth token cleared");

        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }
}

async fn error_from_response(status: StatusCode, is_json: bool, response: Response) -> ApiClientError {
    let fallback = format!("Request failed with status {}", status.as_u16());

    let body = if is_json {
        response.json::<Value>().await.ok()
    } else {
        None
    };

    let Some(body) = body else {
        return ApiClientError::Status {
            status: status.as_u16(),
            code: None,
            message: fallback,
            details: None,
        };
    };

    let text_field = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let message = text_field("message")
        .or_else(|| text_field("error"))
        .unwrap_or(fallback);
    let code = text_field("code");
    let details = match body.get("details") {
        Some(details) if !details.is_null() => details.clone(),
        _ => body.clone(),
    };

    ApiClientError::Status {
        status: status.as_u16(),
        code,
        message,
        details: Some(details),
    }
}
