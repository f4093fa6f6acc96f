//! # API Module
//!
//! Everything that talks to the TalkToLead backend:
//! - `client`: authenticated HTTP with error mapping and GET retries
//! - `endpoints`: backend paths
//! - `models`: wire records as the backend sends them
//! - `transforms`: wire records to view models
//! - `resources`: typed resource calls returning view models

pub mod client;
pub mod endpoints;
pub mod models;
pub mod resources;
pub mod transforms;


pub use client::{ApiClient, RequestOptions, RetryPolicy};
pub use resources::{DashboardClient, DEFAULT_POLL_INTERVAL};
