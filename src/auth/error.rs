use thiserror::Error;

use crate::common::{ApiClientError, StorageError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Api(#[from] ApiClientError),

    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Login response did not include an access token")]
    MissingToken,

    /// The session moved on (e.g. a logout) while this request was in flight
    #[error("Session changed while the request was in flight")]
    Superseded,
}

impl AuthError {
    /// Message suitable for an inline login-form error
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Api(e) => e.to_string(),
            AuthError::NotConfigured(_) => self.to_string(),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// Why a LINE callback could not complete a login
#[derive(Debug, Error)]
pub enum LineCallbackError {
    #[error("{0}")]
    Provider(String),

    #[error("No authorization code received from LINE")]
    MissingCode,

    #[error("Invalid state parameter. Please try again.")]
    InvalidState,

    #[error(transparent)]
    Login(#[from] AuthError),
}
