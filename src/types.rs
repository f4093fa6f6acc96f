//! Frontend view models.
//!
//! These are the UI-ready projections produced by `api::transforms`. Field
//! names serialize in camelCase and every identifier is a `String`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder organization id; the backend does not return one on these records
pub const PLACEHOLDER_ORGANIZATION_ID: &str = "org-001";

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Salesperson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Invited,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub organization_id: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub device_ids: Vec<String>,
    pub created_at: String,
    pub last_active_at: String,
}

// ============================================================================
// Recordings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingStatus {
    Uploading,
    Processing,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCardData {
    pub name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessCard {
    pub id: String,
    pub recording_id: String,
    pub image_url: String,
    pub captured_at: String,
    /// Seconds into the recording at which the card was captured
    pub timestamp_offset: f64,
    pub extracted_data: Option<ExtractedCardData>,
    pub contact_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub device_id: Option<String>,
    pub audio_url: String,
    /// Seconds
    pub duration: f64,
    /// Bytes; always 0 until the backend reports it
    pub file_size: u64,
    pub recorded_at: String,
    pub uploaded_at: String,
    pub status: RecordingStatus,
    pub transcription: Option<String>,
    pub summary: Option<String>,
    pub contact_id: Option<String>,
    pub contact_name: Option<String>,
    pub business_cards: Vec<BusinessCard>,
    pub location: Option<GeoPoint>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

// ============================================================================
// Contacts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSource {
    Recording,
    BusinessCard,
    Manual,
    Import,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub organization_id: String,
    pub created_by_user_id: String,
    pub created_by_user_name: String,
    pub name: String,
    pub company: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: ContactStatus,
    pub assigned_to_user_id: Option<String>,
    pub assigned_to_user_name: Option<String>,
    pub recording_ids: Vec<String>,
    pub recording_count: u64,
    pub business_card_ids: Vec<String>,
    pub source: ContactSource,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    High,
    Medium,
    Low,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPeriod {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub recordings: u64,
    pub duration: f64,
    pub contacts: u64,
    pub activity_level: ActivityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub organization_id: String,
    pub period: SummaryPeriod,
    pub start_date: String,
    pub total_recordings: u64,
    pub total_duration: f64,
    pub active_users: u64,
    pub total_users: u64,
    pub new_contacts: u64,
    pub by_user: Vec<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    /// e.g. `no_activity`, `low_activity`, `target_missed`, `device_offline`
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: AlertSeverity,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub message: String,
    pub details: Option<Value>,
    pub created_at: String,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: String,
    /// e.g. `recording_uploaded`, `contact_added`, `business_card_scanned`
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub description: String,
    pub timestamp: String,
    pub metadata: Option<Map<String, Value>>,
}

/// Everything the manager dashboard page renders from one backend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboardView {
    pub summary: TeamSummary,
    pub alerts: Vec<Alert>,
    pub recent_activity: Vec<RecentActivity>,
}
