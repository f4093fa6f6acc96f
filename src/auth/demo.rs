// src/auth/demo.rs
//! Demo-account login.
//! Only compiled with the `demo-login` feature (and in unit tests); release
//! builds carry no credential check at all.

use super::models::{AuthRole, AuthUser};

pub const DEMO_EMAIL: &str = "demo@talktolead.ai";
pub const DEMO_PASSWORD: &str = "demo";
pub const DEMO_TOKEN: &str = "demo_token_123";

#[derive(Debug, Clone)]
pub struct DemoLogin {
    pub email: String,
    pub password: String,
    pub token: String,
}

impl Default for DemoLogin {
    fn default() -> Self {
        Self {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            token: DEMO_TOKEN.to_string(),
        }
    }
}

impl DemoLogin {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        email == self.email && password == self.password
    }

    /// Canned manager identity used for the demo session.
    /// Uses fixed ids so cached snapshots stay consistent across runs.
    pub fn user(&self) -> AuthUser {
        AuthUser {
            display_name: Some("Demo Manager".to_string()),
            organization_id: Some("demo_org_001".to_string()),
            token_balance: Some(1000),
            ..AuthUser::new("demo_manager_001", self.email.clone(), AuthRole::Manager)
        }
        .with_derived_name()
    }
}

/// Print demo mode status on startup
pub fn print_demo_mode_status(enabled: bool) {
    if enabled {
        println!("⚠️  DEMO LOGIN ENABLED ⚠️");
        println!("   {} / {} signs in without the backend", DEMO_EMAIL, DEMO_PASSWORD);
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exact_pair_matches() {
        let demo = DemoLogin::default();
        assert!(demo.matches("demo@talktolead.ai", "demo"));
        assert!(!demo.matches("demo@talktolead.ai", "Demo"));
        assert!(!demo.matches("DEMO@talktolead.ai", "demo"));
        assert!(!demo.matches("someone@talktolead.ai", "demo"));
    }

    #[test]
    fn test_demo_user_is_a_manager() {
        let user = DemoLogin::default().user();
        assert_eq!(user.id, "demo_manager_001");
        assert_eq!(user.role, AuthRole::Manager);
        assert_eq!(user.name.as_deref(), Some("Demo Manager"));
        assert_eq!(user.token_balance, Some(1000));
    }
}
