//! Authentication data models

use serde::{Deserialize, Serialize};

use crate::common::helpers::{deserialize_id, deserialize_opt_id};
use crate::common::non_empty;

/// Account role as reported by `/auth/current_user`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthRole {
    User,
    Manager,
    Admin,
}

/// The authenticated identity held by the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Derived: `display_name` when set, otherwise `email`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: AuthRole,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_balance: Option<i64>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: AuthRole) -> Self {
        Self {
            id: id.into(),
            uuid: None,
            email: email.into(),
            display_name: None,
            name: None,
            role,
            organization_id: None,
            avatar: None,
            subscription_tier: None,
            token_balance: None,
        }
    }

    /// Fills `name` from `display_name`, falling back to `email`
    pub fn with_derived_name(mut self) -> Self {
        self.name = Some(
            non_empty(self.display_name.as_deref())
                .unwrap_or(&self.email)
                .to_string(),
        );
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Response of the password and Google token exchanges
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Google ID token payload for `/auth/google`
#[derive(Debug, Clone, Serialize)]
pub struct GoogleIdTokenPayload {
    pub id_token: String,
}

/// Body of `/auth/line/token`
#[derive(Debug, Clone, Serialize)]
pub struct LineTokenRequest {
    pub code: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineLoginResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<LineUser>,
}

/// LINE identity; LINE does not share an email address
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineUser {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub uid: Option<String>,
    pub username: Option<String>,
    pub provider: Option<String>,
}

impl LineUser {
    /// Maps the provider identity onto the common shape, always with role `user`
    pub fn into_auth_user(self) -> AuthUser {
        let display_name = non_empty(self.username.as_deref())
            .unwrap_or("LINE User")
            .to_string();

        AuthUser {
            display_name: Some(display_name.clone()),
            name: Some(display_name),
            ..AuthUser::new(self.uid.unwrap_or_default(), "", AuthRole::User)
        }
    }
}

/// Views the session guard distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Protected,
}

/// Where the caller should navigate next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }
}
