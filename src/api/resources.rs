//! Typed access to the dashboard resources. Every read returns view models;
//! wire records never leave this module.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use super::client::{ApiClient, RequestOptions};
use super::endpoints;
use super::models::{
    ApiContact, ApiManagerDashboard, ApiRecording, ApiRecordingStatus, ApiSubordinate,
    ApiUserSummary, ContactInput,
};
use super::transforms::{
    map_recording_status, transform_contact, transform_contacts, transform_manager_dashboard,
    transform_recording, transform_recordings, transform_subordinates, transform_user_summaries,
};
use crate::common::ApiClientError;
use crate::types::{Contact, ManagerDashboardView, Recording, RecordingStatus, User, UserSummary};

/// Interval between status checks while a recording is being processed
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: ApiClient,
}

impl DashboardClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // ------------------------------------------------------------------------
    // Recordings
    // ------------------------------------------------------------------------

    pub async fn recordings(&self) -> Result<Vec<Recording>, ApiClientError> {
        let records: Vec<ApiRecording> = self
            .client
            .get(endpoints::voice::LIST, RequestOptions::default())
            .await?;
        debug!(count = records.len(), "Fetched recordings");
        Ok(transform_recordings(&records))
    }

    pub async fn recording(&self, id: &str) -> Result<Recording, ApiClientError> {
        let record: ApiRecording = self
            .client
            .get(&endpoints::voice::detail(id), RequestOptions::default())
            .await?;
        Ok(transform_recording(&record))
    }

    /// Raw backend status (`pending`, `processing`, `completed`, `failed`)
    pub async fn recording_status(&self, id: &str) -> Result<String, ApiClientError> {
        let body: ApiRecordingStatus = self
            .client
            .get(&endpoints::voice::status(id), RequestOptions::default())
            .await?;
        Ok(body.status)
    }

    /// Polls the status endpoint every `interval` while the backend reports
    /// `pending` or `processing`, then returns the settled status.
    pub async fn wait_for_recording(
        &self,
        id: &str,
        interval: Duration,
    ) -> Result<RecordingStatus, ApiClientError> {
        loop {
            let status = self.recording_status(id).await?;
            if !matches!(status.as_str(), "pending" | "processing") {
                info!(recording_id = %id, status = %status, "Recording settled");
                return Ok(map_recording_status(&status));
            }
            debug!(recording_id = %id, status = %status, "Recording still in progress");
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn delete_recording(&self, id: &str) -> Result<(), ApiClientError> {
        let _: Value = self
            .client
            .delete(&endpoints::voice::detail(id), RequestOptions::default())
            .await?;
        info!(recording_id = %id, "Recording deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------------

    pub async fn contacts(&self) -> Result<Vec<Contact>, ApiClientError> {
        let records: Vec<ApiContact> = self
            .client
            .get(endpoints::contacts::LIST, RequestOptions::default())
            .await?;
        debug!(count = records.len(), "Fetched contacts");
        Ok(transform_contacts(&records))
    }

    pub async fn contact(&self, id: &str) -> Result<Contact, ApiClientError> {
        let record: ApiContact = self
            .client
            .get(&endpoints::contacts::detail(id), RequestOptions::default())
            .await?;
        Ok(transform_contact(&record))
    }

    pub async fn create_contact(&self, input: &ContactInput) -> Result<Contact, ApiClientError> {
        let record: ApiContact = self
            .client
            .post(endpoints::contacts::CREATE, input, RequestOptions::default())
            .await?;
        info!(contact_id = %record.id, "Contact created");
        Ok(transform_contact(&record))
    }

    pub async fn update_contact(
        &self,
        id: &str,
        input: &ContactInput,
    ) -> Result<Contact, ApiClientError> {
        let record: ApiContact = self
            .client
            .put(&endpoints::contacts::detail(id), input, RequestOptions::default())
            .await?;
        info!(contact_id = %record.id, "Contact updated");
        Ok(transform_contact(&record))
    }

    pub async fn delete_contact(&self, id: &str) -> Result<(), ApiClientError> {
        let _: Value = self
            .client
            .delete(&endpoints::contacts::detail(id), RequestOptions::default())
            .await?;
        info!(contact_id = %id, "Contact deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Manager views
    // ------------------------------------------------------------------------

    pub async fn manager_dashboard(&self) -> Result<ManagerDashboardView, ApiClientError> {
        let dashboard: ApiManagerDashboard = self
            .client
            .get(endpoints::manager::DASHBOARD, RequestOptions::default())
            .await?;
        Ok(transform_manager_dashboard(&dashboard))
    }

    pub async fn subordinates(&self) -> Result<Vec<User>, ApiClientError> {
        let records: Vec<ApiSubordinate> = self
            .client
            .get(endpoints::manager::SUBORDINATES, RequestOptions::default())
            .await?;
        Ok(transform_subordinates(&records))
    }

    pub async fn subordinate_recordings(&self, id: &str) -> Result<Vec<Recording>, ApiClientError> {
        let records: Vec<ApiRecording> = self
            .client
            .get(
                &endpoints::manager::subordinate_recordings(id),
                RequestOptions::default(),
            )
            .await?;
        Ok(transform_recordings(&records))
    }

    pub async fn team_summary(&self) -> Result<Vec<UserSummary>, ApiClientError> {
        let records: Vec<ApiUserSummary> = self
            .client
            .get(endpoints::manager::TEAM_SUMMARY, RequestOptions::default())
            .await?;
        Ok(transform_user_summaries(&records))
    }
}
