//! Incident report submission.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::location::LocationProvider;
use crate::model::{GeoPoint, IncidentReport, IncidentStatus, ReportDraft};
use crate::server::{documents, DocumentRef, DocumentStore};

/// Validates and submits incident reports on behalf of one signed-in
/// reporter. Exactly one document is created per successful submission;
/// every failure path performs zero writes.
pub struct SubmissionFlow<'a> {
    /// Destination store.
    store: &'a dyn DocumentStore,
    /// Source of the device position.
    location: &'a dyn LocationProvider,
    /// Identifier of the authenticated reporter.
    reporter_id: String,
}

impl<'a> SubmissionFlow<'a> {
    /// Build a flow for the given reporter.
    pub fn new(
        store: &'a dyn DocumentStore,
        location: &'a dyn LocationProvider,
        reporter_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            location,
            reporter_id: reporter_id.into(),
        }
    }

    /// Submit a draft. All validation runs before any write: device
    /// location, then description, then the custom time fields. On success
    /// the draft's volatile fields are cleared so the caller can show a
    /// success notification over an empty form; on failure the draft is
    /// left untouched for a retry.
    ///
    /// The record-creation and update timestamps are assigned by the store's
    /// clock at write time, not here.
    pub async fn submit(&self, draft: &mut ReportDraft) -> Result<DocumentRef> {
        let position = self.location.acquire().await?;
        let description = draft.validated_description()?;
        let incident_time = draft.effective_timestamp(Utc::now())?;
        let location = GeoPoint::new(position.latitude, position.longitude)?;

        let report = IncidentReport {
            reporter_id: self.reporter_id.clone(),
            incident_type: draft.category,
            description,
            location,
            incident_time,
            status: IncidentStatus::Pending,
        };
        let document =
            serde_json::to_value(&report).map_err(|err| Error::Unknown(err.to_string()))?;

        let reference = self.store.create(documents::INCIDENTS, document).await?;

        draft.reset_after_submit();
        Ok(reference)
    }
}
