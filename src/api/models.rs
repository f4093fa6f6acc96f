// src/api/models.rs
//
// Wire-format records exactly as the backend emits them (snake_case,
// numeric ids). Ids are coerced to strings while deserializing; required
// ids that are missing fail the whole payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::helpers::{deserialize_id, deserialize_opt_id};
use crate::types::{ActivityLevel, AlertSeverity, UserStatus};

// ============================================================================
// Recordings
// ============================================================================

/// User embedded in a recording payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiUserRef {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Contact embedded in a recording payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiContactRef {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub primary_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecording {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    pub user: Option<ApiUserRef>,
    #[serde(default)]
    pub audio_url: String,
    pub duration: Option<f64>,
    pub waveform: Option<String>,
    /// `pending` | `processing` | `completed` | `failed`
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub contact_id: Option<String>,
    pub contact: Option<ApiContactRef>,
    pub transcription: Option<ApiTranscription>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTranscription {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub recording_id: Option<String>,
    pub text: Option<TranscriptionText>,
    pub minutes: Option<MeetingMinutes>,
    pub executive_summary: Option<ExecutiveSummary>,
    pub duration: Option<f64>,
    pub token_usage: Option<u64>,
    pub created_at: Option<String>,
}

/// The backend stores transcripts either flattened or as timed segments
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TranscriptionText {
    Plain(String),
    Segments(Vec<TranscriptionSegment>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSegment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    pub text: String,
    pub speaker: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingMinutes {
    pub summary: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub decisions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutiveSummary {
    pub summary: Option<String>,
    pub sentiment: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Body of `GET /api/voice/recordings/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecordingStatus {
    pub status: String,
}

// ============================================================================
// Contacts
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiContact {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub company_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub primary_email: Option<String>,
    pub work_phone: Option<String>,
    pub mobile_number: Option<String>,
    pub fax_number: Option<String>,
    pub job_title: Option<String>,
    pub notes: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub crm_id: Option<String>,
    pub crm_provider: Option<String>,
    #[serde(default)]
    pub languages: Vec<ApiContactLanguage>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Per-language variant of a contact's business-card data
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiContactLanguage {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub language_code: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
}

/// Writable subset of a contact for create/update calls
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

// ============================================================================
// Manager dashboard
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSubordinate {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub uuid: Option<String>,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub status: UserStatus,
    pub recordings_count: Option<u64>,
    pub contacts_count: Option<u64>,
    pub last_active_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUserSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    pub user_name: String,
    pub email: Option<String>,
    pub recordings: u64,
    pub duration: f64,
    pub contacts: u64,
    pub activity_level: ActivityLevel,
    pub last_active: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecentActivity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    pub user_name: String,
    pub description: String,
    pub timestamp: String,
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAlert {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: AlertSeverity,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    pub user_name: String,
    pub message: String,
    pub details: Option<Value>,
    pub created_at: String,
    #[serde(default)]
    pub is_read: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiManagerDashboard {
    pub total_recordings: u64,
    pub total_duration: f64,
    pub active_users: u64,
    pub total_users: u64,
    pub new_contacts: u64,
    #[serde(default)]
    pub recent_activity: Vec<ApiRecentActivity>,
    #[serde(default)]
    pub alerts: Vec<ApiAlert>,
    #[serde(default)]
    pub by_user: Vec<ApiUserSummary>,
}
