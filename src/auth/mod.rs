//! # Auth Module
//!
//! Session state and login flows for the dashboard:
//! - Password, Google and LINE logins
//! - Session bootstrap from persisted credentials, with revalidation
//! - Logout and soft identity refresh
//! - Route guarding for protected and login views

pub mod api;
pub mod credentials;
#[cfg(any(test, feature = "demo-login"))]
pub mod demo;
pub mod error;
pub mod line;
pub mod models;
pub mod session;


pub use api::AuthApi;
pub use credentials::CredentialStore;
#[cfg(any(test, feature = "demo-login"))]
pub use demo::DemoLogin;
pub use error::{AuthError, LineCallbackError};
pub use line::{LineCallback, LineOAuth};
pub use models::{AuthRole, AuthUser, Route, View};
pub use session::{route_for, SessionManager, SessionState, SessionStatus};
