//! TalkToLead dashboard client library.
//!
//! - `api`: backend client, wire models and the transforms to view models
//! - `auth`: session state, login flows and LINE OAuth
//! - `common`: configuration, errors, storage and logging helpers
//! - `types`: view models consumed by the dashboard

pub mod api;
pub mod auth;
pub mod common;
pub mod types;

pub use api::{ApiClient, DashboardClient};
pub use auth::{SessionManager, SessionState, SessionStatus};
pub use common::{ApiClientError, AppConfig};
