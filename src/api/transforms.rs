//! Conversions from backend wire records to frontend view models.
//!
//! Every function here is pure: no I/O, no mutation of the input. Fields
//! the backend cannot supply yet (`file_size`, contact `status`, the
//! organization id, ...) are filled with fixed values; they are known gaps
//! in the backend contract, not computed data.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use super::models::{
    ApiAlert, ApiContact, ApiContactRef, ApiManagerDashboard, ApiRecentActivity, ApiRecording,
    ApiSubordinate, ApiTranscription, ApiUserSummary, TranscriptionText,
};
use crate::common::non_empty;
use crate::types::{
    Alert, Contact, ContactSource, ContactStatus, ManagerDashboardView, RecentActivity, Recording,
    RecordingStatus, SummaryPeriod, TeamSummary, User, UserRole, UserSummary,
    PLACEHOLDER_ORGANIZATION_ID,
};

// ============================================================================
// Recordings
// ============================================================================

pub fn transform_recording(api: &ApiRecording) -> Recording {
    let transcription = api.transcription.as_ref();

    Recording {
        id: api.id.clone(),
        organization_id: PLACEHOLDER_ORGANIZATION_ID.to_string(),
        user_id: api.user_id.clone(),
        user_name: recording_user_name(api),
        user_avatar: None,
        device_id: None,
        audio_url: api.audio_url.clone(),
        duration: api.duration.unwrap_or(0.0),
        file_size: 0,
        recorded_at: api.created_at.clone(),
        uploaded_at: api.created_at.clone(),
        status: map_recording_status(&api.status),
        transcription: transcription.and_then(transcription_text),
        summary: transcription.and_then(transcription_summary),
        contact_id: api.contact_id.clone(),
        contact_name: api.contact.as_ref().and_then(contact_ref_name),
        business_cards: Vec::new(),
        location: None,
        tags: Vec::new(),
        notes: None,
    }
}

pub fn transform_recordings(recordings: &[ApiRecording]) -> Vec<Recording> {
    recordings.iter().map(transform_recording).collect()
}

/// Unknown backend statuses are treated as still in progress
pub fn map_recording_status(status: &str) -> RecordingStatus {
    match status {
        "pending" => RecordingStatus::Uploading,
        "processing" => RecordingStatus::Processing,
        "completed" => RecordingStatus::Ready,
        "failed" => RecordingStatus::Failed,
        _ => RecordingStatus::Processing,
    }
}

fn recording_user_name(api: &ApiRecording) -> String {
    let user = api.user.as_ref();
    non_empty(user.and_then(|u| u.display_name.as_deref()))
        .or_else(|| non_empty(user.and_then(|u| u.email.as_deref())))
        .unwrap_or("Unknown")
        .to_string()
}

fn transcription_text(transcription: &ApiTranscription) -> Option<String> {
    match transcription.text.as_ref()? {
        TranscriptionText::Plain(text) => non_empty(Some(text.as_str())).map(str::to_string),
        TranscriptionText::Segments(segments) => Some(
            segments
                .iter()
                .map(|seg| seg.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        ),
    }
}

// First match wins; the two summaries are never combined.
fn transcription_summary(transcription: &ApiTranscription) -> Option<String> {
    let executive = transcription
        .executive_summary
        .as_ref()
        .and_then(|s| non_empty(s.summary.as_deref()));
    let minutes = transcription
        .minutes
        .as_ref()
        .and_then(|m| non_empty(m.summary.as_deref()));

    executive.or(minutes).map(str::to_string)
}

fn contact_ref_name(contact: &ApiContactRef) -> Option<String> {
    let full = format!(
        "{} {}",
        contact.first_name.as_deref().unwrap_or(""),
        contact.last_name.as_deref().unwrap_or("")
    );
    let full = full.trim();

    if full.is_empty() {
        non_empty(contact.primary_email.as_deref()).map(str::to_string)
    } else {
        Some(full.to_string())
    }
}

// ============================================================================
// Contacts
// ============================================================================

pub fn transform_contact(api: &ApiContact) -> Contact {
    let name_parts: Vec<&str> = [api.first_name.as_deref(), api.last_name.as_deref()]
        .into_iter()
        .filter_map(non_empty)
        .collect();
    let joined = name_parts.join(" ");
    let name = non_empty(Some(joined.trim()))
        .or_else(|| non_empty(api.primary_email.as_deref()))
        .unwrap_or("Unknown")
        .to_string();

    let primary_language = api
        .languages
        .iter()
        .find(|l| l.language_code == "EN")
        .or_else(|| api.languages.first());

    let company = primary_language
        .and_then(|l| non_empty(l.company.as_deref()))
        .map(str::to_string);
    let title = non_empty(api.job_title.as_deref())
        .or_else(|| primary_language.and_then(|l| non_empty(l.job_title.as_deref())))
        .map(str::to_string);
    let phone = non_empty(api.mobile_number.as_deref())
        .or_else(|| non_empty(api.work_phone.as_deref()))
        .map(str::to_string);

    Contact {
        id: api.id.clone(),
        organization_id: PLACEHOLDER_ORGANIZATION_ID.to_string(),
        created_by_user_id: api.user_id.clone(),
        // No backend source yet; resolving it needs a separate user lookup
        created_by_user_name: String::new(),
        name,
        company,
        title,
        email: non_empty(api.primary_email.as_deref()).map(str::to_string),
        phone,
        // The backend has no contact status field yet
        status: ContactStatus::New,
        assigned_to_user_id: Some(api.user_id.clone()),
        assigned_to_user_name: None,
        recording_ids: Vec::new(),
        recording_count: 0,
        business_card_ids: Vec::new(),
        source: ContactSource::Manual,
        tags: Vec::new(),
        notes: non_empty(api.notes.as_deref()).map(str::to_string),
        created_at: api.created_at.clone(),
        updated_at: non_empty(api.updated_at.as_deref())
            .unwrap_or(&api.created_at)
            .to_string(),
    }
}

pub fn transform_contacts(contacts: &[ApiContact]) -> Vec<Contact> {
    contacts.iter().map(transform_contact).collect()
}

// ============================================================================
// Team members
// ============================================================================

pub fn transform_subordinate(api: &ApiSubordinate) -> User {
    User {
        id: api.id.clone(),
        organization_id: PLACEHOLDER_ORGANIZATION_ID.to_string(),
        email: api.email.clone(),
        name: non_empty(api.display_name.as_deref())
            .unwrap_or(&api.email)
            .to_string(),
        avatar: None,
        role: if api.role == "manager" {
            UserRole::Manager
        } else {
            UserRole::Salesperson
        },
        status: api.status,
        device_ids: Vec::new(),
        created_at: api.created_at.clone(),
        last_active_at: non_empty(api.last_active_at.as_deref())
            .unwrap_or(&api.created_at)
            .to_string(),
    }
}

pub fn transform_subordinates(subordinates: &[ApiSubordinate]) -> Vec<User> {
    subordinates.iter().map(transform_subordinate).collect()
}

// ============================================================================
// Dashboard
// ============================================================================

pub fn transform_user_summary(api: &ApiUserSummary) -> UserSummary {
    UserSummary {
        user_id: api.user_id.clone(),
        user_name: api.user_name.clone(),
        user_avatar: None,
        recordings: api.recordings,
        duration: api.duration,
        contacts: api.contacts,
        activity_level: api.activity_level,
    }
}

pub fn transform_user_summaries(summaries: &[ApiUserSummary]) -> Vec<UserSummary> {
    summaries.iter().map(transform_user_summary).collect()
}

pub fn transform_alert(api: &ApiAlert) -> Alert {
    Alert {
        id: api.id.clone(),
        kind: api.kind.clone(),
        severity: api.severity,
        user_id: api.user_id.clone(),
        user_name: api.user_name.clone(),
        user_avatar: None,
        message: api.message.clone(),
        details: api.details.clone(),
        created_at: api.created_at.clone(),
        is_read: api.is_read,
    }
}

pub fn transform_alerts(alerts: &[ApiAlert]) -> Vec<Alert> {
    alerts.iter().map(transform_alert).collect()
}

pub fn transform_recent_activity(api: &ApiRecentActivity) -> RecentActivity {
    RecentActivity {
        id: api.id.clone(),
        kind: api.kind.clone(),
        user_id: api.user_id.clone(),
        user_name: api.user_name.clone(),
        user_avatar: None,
        description: api.description.clone(),
        timestamp: api.timestamp.clone(),
        metadata: api.metadata.clone(),
    }
}

pub fn transform_recent_activities(activities: &[ApiRecentActivity]) -> Vec<RecentActivity> {
    activities.iter().map(transform_recent_activity).collect()
}

/// Weekly team summary, with the window ending now
pub fn transform_dashboard(api: &ApiManagerDashboard) -> TeamSummary {
    transform_dashboard_at(api, Utc::now())
}

pub fn transform_dashboard_at(api: &ApiManagerDashboard, now: DateTime<Utc>) -> TeamSummary {
    let start = now - Duration::days(7);

    TeamSummary {
        organization_id: PLACEHOLDER_ORGANIZATION_ID.to_string(),
        period: SummaryPeriod::Week,
        start_date: start.to_rfc3339_opts(SecondsFormat::Millis, true),
        total_recordings: api.total_recordings,
        total_duration: api.total_duration,
        active_users: api.active_users,
        total_users: api.total_users,
        new_contacts: api.new_contacts,
        by_user: transform_user_summaries(&api.by_user),
    }
}

pub fn transform_manager_dashboard(api: &ApiManagerDashboard) -> ManagerDashboardView {
    ManagerDashboardView {
        summary: transform_dashboard(api),
        alerts: transform_alerts(&api.alerts),
        recent_activity: transform_recent_activities(&api.recent_activity),
    }
}
