//! Recent-incident and resource retrieval.

use chrono::{DateTime, Local, Utc};
use thiserror::Error;

use crate::error::StoreError;
use crate::location::Position;
use crate::model::{IncidentCategory, IncidentStatus, ResourceEntry};
use crate::server::{documents, DocumentStore, Query, StoredDocument};

/// Placeholder shown when a record carries no usable timestamp.
pub const TIME_UNAVAILABLE: &str = "Time not available";

/// How many incidents the dashboard's recent list shows.
pub const DASHBOARD_RECENT_LIMIT: u32 = 5;

/// A store failure classified into an error state the caller can render,
/// with a manual retry expected rather than any automatic one.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", self.user_message())]
pub struct FetchError(pub StoreError);

impl FetchError {
    /// The banner text for this failure.
    pub fn user_message(&self) -> &'static str {
        match self.0 {
            StoreError::PermissionDenied => "You do not have permission to view incidents.",
            StoreError::Unavailable => "Network error. Please check your internet connection.",
            StoreError::Other(_) => "Failed to fetch incidents. Please try again.",
        }
    }
}

impl From<StoreError> for FetchError {
    fn from(error: StoreError) -> Self {
        Self(error)
    }
}

/// An incident mapped for display: timestamps already rendered as local
/// strings, coordinates kept only when numerically present.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentView {
    /// Store document identifier.
    pub id: String,
    /// Category, defaulting to sighting when unrecognized.
    pub category: IncidentCategory,
    /// Free-text description.
    pub description: String,
    /// Report status.
    pub status: IncidentStatus,
    /// Incident instant as a local display string, or the placeholder.
    pub incident_time: String,
    /// Record-creation instant as a local display string, or the placeholder.
    pub created_at: String,
    /// Marker position, when the record has numeric coordinates.
    pub position: Option<Position>,
}

impl IncidentView {
    /// Short description for the recent-alerts list.
    pub fn preview(&self) -> String {
        let mut preview: String = self.description.chars().take(40).collect();
        if preview.len() < self.description.len() {
            preview.push_str("...");
        }
        preview
    }
}

/// Reads recent incidents and resources. Never panics across its public
/// boundary; every store failure comes back as a [`FetchError`].
pub struct RetrievalFlow<'a> {
    /// Source store.
    store: &'a dyn DocumentStore,
}

impl<'a> RetrievalFlow<'a> {
    /// Build a flow over the given store.
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch incidents newest-first, optionally capped at `limit`. Records
    /// that cannot be fully interpreted still appear in the result with
    /// placeholder fields; only the store call itself can fail.
    pub async fn fetch_recent(
        &self,
        limit: Option<u32>,
    ) -> core::result::Result<Vec<IncidentView>, FetchError> {
        let found = self
            .store
            .query(documents::INCIDENTS, Query::newest_first(limit))
            .await?;

        Ok(found.into_iter().map(view_from_document).collect())
    }

    /// Fetch the managed educational content. Entries that do not parse are
    /// skipped rather than failing the whole read.
    pub async fn fetch_resources(
        &self,
    ) -> core::result::Result<Vec<ResourceEntry>, FetchError> {
        let found = self
            .store
            .query(documents::RESOURCES, Query::default())
            .await?;

        Ok(found
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc.data).ok())
            .collect())
    }
}

/// The subset of incidents that can be rendered as map markers. The list
/// view shows everything; the map only shows geolocated records, so the
/// marker count never exceeds the list count.
pub fn map_markers(incidents: &[IncidentView]) -> Vec<Position> {
    incidents.iter().filter_map(|view| view.position).collect()
}

/// Map a raw document into its view. Interpretation is deliberately
/// tolerant: this data is written by many client versions.
fn view_from_document(doc: StoredDocument) -> IncidentView {
    let data = &doc.data;

    let category = data["incidentType"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    let status: IncidentStatus =
        serde_json::from_value(data["status"].clone()).unwrap_or_default();
    let description = data["description"].as_str().unwrap_or_default().to_string();

    let incident_time = data["incidentTime"]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| format_timestamp(dt.with_timezone(&Utc)))
        .unwrap_or_else(|| TIME_UNAVAILABLE.to_string());
    let created_at = doc
        .created_at
        .map(format_timestamp)
        .unwrap_or_else(|| TIME_UNAVAILABLE.to_string());

    let position = match (
        data["location"]["latitude"].as_f64(),
        data["location"]["longitude"].as_f64(),
    ) {
        (Some(latitude), Some(longitude)) => Some(Position {
            latitude,
            longitude,
        }),
        _ => None,
    };

    IncidentView {
        id: doc.id,
        category,
        description,
        status,
        incident_time,
        created_at,
        position,
    }
}

/// Render an instant in the device's local time.
fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::flow::testing::RecordingStore;

    fn document(id: &str, data: serde_json::Value) -> StoredDocument {
        serde_json::from_value(json!({
            "id": id,
            "createdAt": "2025-03-01T10:00:00Z",
            "data": data,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_recent_queries_newest_first() {
        let store = RecordingStore::default();
        let flow = RetrievalFlow::new(&store);

        flow.fetch_recent(Some(DASHBOARD_RECENT_LIMIT)).await.unwrap();

        let queries = store.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0],
            ("incidents".to_string(), Query::newest_first(Some(5)))
        );
    }

    #[tokio::test]
    async fn test_views_are_mapped() {
        let store = RecordingStore::with_documents(vec![document(
            "inc-1",
            json!({
                "incidentType": "conflict",
                "description": "Goat taken from the pen",
                "status": "pending",
                "incidentTime": "2025-02-28T21:15:00Z",
                "location": {"latitude": 6.9, "longitude": 80.8, "geohash": "tc3pv5h2e"},
            }),
        )]);
        let flow = RetrievalFlow::new(&store);

        let incidents = flow.fetch_recent(None).await.unwrap();
        assert_eq!(incidents.len(), 1);

        let view = &incidents[0];
        assert_eq!(view.id, "inc-1");
        assert_eq!(view.category, IncidentCategory::Conflict);
        assert_eq!(view.status, IncidentStatus::Pending);
        assert_ne!(view.incident_time, TIME_UNAVAILABLE);
        assert_eq!(
            view.position,
            Some(Position {
                latitude: 6.9,
                longitude: 80.8
            })
        );
    }

    #[tokio::test]
    async fn test_missing_timestamp_gets_placeholder() {
        let store = RecordingStore::with_documents(vec![StoredDocument {
            id: "inc-2".to_string(),
            created_at: None,
            updated_at: None,
            data: json!({"incidentType": "sighting", "description": "spotted at dusk"}),
        }]);
        let flow = RetrievalFlow::new(&store);

        let incidents = flow.fetch_recent(None).await.unwrap();
        assert_eq!(incidents[0].incident_time, TIME_UNAVAILABLE);
        assert_eq!(incidents[0].created_at, TIME_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_non_numeric_coordinates_stay_in_list_but_off_map() {
        let store = RecordingStore::with_documents(vec![
            document(
                "good",
                json!({
                    "description": "by the river",
                    "location": {"latitude": 6.9, "longitude": 80.8},
                }),
            ),
            document(
                "no-location",
                json!({"description": "phoned in, no GPS"}),
            ),
            document(
                "text-coordinates",
                json!({
                    "description": "migrated record",
                    "location": {"latitude": "6.9", "longitude": "80.8"},
                }),
            ),
        ]);
        let flow = RetrievalFlow::new(&store);

        let incidents = flow.fetch_recent(None).await.unwrap();
        let markers = map_markers(&incidents);

        assert_eq!(incidents.len(), 3);
        assert_eq!(markers.len(), 1);
        assert!(markers.len() <= incidents.len());
    }

    #[tokio::test]
    async fn test_unknown_status_does_not_fail_the_fetch() {
        let store = RecordingStore::with_documents(vec![document(
            "inc-3",
            json!({"description": "x", "status": "verified"}),
        )]);
        let flow = RetrievalFlow::new(&store);

        let incidents = flow.fetch_recent(None).await.unwrap();
        assert_eq!(incidents[0].status, IncidentStatus::Unknown);
    }

    #[tokio::test]
    async fn test_permission_denied_message() {
        let store = RecordingStore::failing(StoreError::PermissionDenied);
        let flow = RetrievalFlow::new(&store);

        let err = flow.fetch_recent(None).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "You do not have permission to view incidents."
        );
    }

    #[tokio::test]
    async fn test_unavailable_message() {
        let store = RecordingStore::failing(StoreError::Unavailable);
        let flow = RetrievalFlow::new(&store);

        let err = flow.fetch_recent(None).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Network error. Please check your internet connection."
        );
    }

    #[tokio::test]
    async fn test_other_failures_get_generic_message() {
        let store = RecordingStore::failing(StoreError::Other("boom".to_string()));
        let flow = RetrievalFlow::new(&store);

        let err = flow.fetch_recent(None).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Failed to fetch incidents. Please try again."
        );
    }

    #[tokio::test]
    async fn test_fetch_resources_skips_malformed_entries() {
        let store = RecordingStore::with_documents(vec![
            document(
                "res-1",
                json!({
                    "title": "Leopard Habitat Conservation",
                    "image": "https://example.com/a.jpg",
                    "shortDescription": "short",
                    "fullDescription": "full",
                }),
            ),
            document("res-2", json!({"title": 42})),
        ]);
        let flow = RetrievalFlow::new(&store);

        let resources = flow.fetch_resources().await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].title, "Leopard Habitat Conservation");
    }

    #[test]
    fn test_preview_truncates_long_descriptions() {
        let view = IncidentView {
            id: "x".to_string(),
            category: IncidentCategory::Sighting,
            description: "a".repeat(60),
            status: IncidentStatus::Pending,
            incident_time: TIME_UNAVAILABLE.to_string(),
            created_at: TIME_UNAVAILABLE.to_string(),
            position: None,
        };
        assert_eq!(view.preview().len(), 43);

        let short = IncidentView {
            description: "two cubs".to_string(),
            ..view
        };
        assert_eq!(short.preview(), "two cubs");
    }
}
