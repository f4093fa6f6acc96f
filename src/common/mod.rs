// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{AppConfig, LineConfig};
pub use error::ApiClientError;
pub use helpers::{non_empty, safe_email_log, safe_token_log};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
