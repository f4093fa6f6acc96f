//! LINE Login (OAuth 2.1 authorization-code flow)
//!
//! 1. `LineOAuth::auth_url` stores a CSRF state and returns the LINE
//!    authorization URL to open in a browser.
//! 2. LINE redirects back to the callback URL with `code` and `state`.
//! 3. `LineOAuth::check_callback` consumes the stored state and yields the code.
//! 4. `SessionManager::login_with_line` exchanges the code through the backend.

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

use super::error::{AuthError, LineCallbackError};
use crate::common::{KeyValueStore, LineConfig};

pub const LINE_AUTHORIZE_URL: &str = "https://access.line.me/oauth2/v2.1/authorize";
pub const LINE_OAUTH_STATE_KEY: &str = "line_oauth_state";
pub const LINE_SCOPE: &str = "profile openid";

const STATE_BYTES: usize = 16;

#[derive(Clone)]
pub struct LineOAuth {
    config: LineConfig,
    /// Session-scoped store; cleared when the process ends
    state_store: Arc<dyn KeyValueStore>,
}

impl LineOAuth {
    pub fn new(config: LineConfig, state_store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config,
            state_store,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config
            .channel_id
            .as_deref()
            .map_or(false, |id| !id.is_empty())
    }

    pub fn callback_url(&self) -> &str {
        &self.config.callback_url
    }

    /// Builds the authorization URL and records a fresh CSRF state,
    /// replacing any attempt still outstanding.
    pub fn auth_url(&self) -> Result<String, AuthError> {
        let channel_id = self
            .config
            .channel_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::NotConfigured("LINE_CHANNEL_ID"))?;

        let state = generate_state();
        self.state_store.set(LINE_OAUTH_STATE_KEY, &state)?;

        let url = format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}&scope={}",
            LINE_AUTHORIZE_URL,
            urlencoding::encode(channel_id),
            urlencoding::encode(&self.config.callback_url),
            urlencoding::encode(&state),
            urlencoding::encode(LINE_SCOPE)
        );

        debug!(redirect_uri = %self.config.callback_url, "Generated LINE authorization URL");
        Ok(url)
    }

    /// Consumes the stored state; `true` only when it equals `received`.
    /// Never fails: a missing state or a store error both read as `false`.
    pub fn verify_state(&self, received: &str) -> bool {
        match self.state_store.take(LINE_OAUTH_STATE_KEY) {
            Ok(Some(saved)) => saved.as_bytes() == received.as_bytes(),
            Ok(None) => {
                debug!("No LINE OAuth state stored");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to read LINE OAuth state");
                false
            }
        }
    }

    /// Validates a callback and returns the authorization code
    pub fn check_callback(&self, callback: &LineCallback) -> Result<String, LineCallbackError> {
        if callback.error.is_some() {
            let message = callback
                .error_description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "LINE authentication was cancelled or failed".to_string());
            warn!(error = ?callback.error, "LINE returned an error on callback");
            return Err(LineCallbackError::Provider(message));
        }

        let code = callback
            .code
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or(LineCallbackError::MissingCode)?;

        match callback.state.as_deref() {
            Some(state) if !state.is_empty() && self.verify_state(state) => Ok(code),
            _ => {
                warn!("LINE callback state did not match the stored state");
                Err(LineCallbackError::InvalidState)
            }
        }
    }
}

/// 16 random bytes, lowercase hex
fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Query parameters LINE appends to the callback URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl LineCallback {
    /// Accepts a full callback URL, a path with a query, or a bare query
    /// string (`code=..&state=..`)
    pub fn from_query(input: &str) -> Self {
        let url = Url::parse(input).ok();
        let pairs = match &url {
            Some(url) => url.query_pairs(),
            None => {
                let query = input.split_once('?').map_or(input, |(_, query)| query);
                let query = query.split('#').next().unwrap_or_default();
                form_urlencoded::parse(query.as_bytes())
            }
        };

        let mut callback = LineCallback::default();
        for (key, value) in pairs {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "code" => callback.code = value,
                "state" => callback.state = value,
                "error" => callback.error = value,
                "error_description" => callback.error_description = value,
                _ => {}
            }
        }
        callback
    }
}
