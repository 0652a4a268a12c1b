use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::StoreError;

/// Collection holding incident reports.
pub const INCIDENTS: &str = "incidents";
/// Collection holding user profiles, keyed by identity uid.
pub const USERS: &str = "users";
/// Collection holding managed educational content.
pub const RESOURCES: &str = "resources";

/// Query options supported by the store: order by one field, optionally
/// capped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Field to order by, in the document's own (wire) naming.
    pub order_by: Option<&'static str>,
    /// Sort newest-first when true.
    pub descending: bool,
    /// Maximum number of documents to return.
    pub limit: Option<u32>,
}

impl Query {
    /// The one query shape the app issues: newest records first, optionally
    /// capped.
    pub fn newest_first(limit: Option<u32>) -> Self {
        Self {
            order_by: Some("createdAt"),
            descending: true,
            limit,
        }
    }
}

/// Store-assigned metadata returned from a write.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    /// Generated document identifier.
    pub id: String,
    /// Record-creation instant, per the server clock.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Record-update instant, per the server clock.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A document as read back from the store: metadata envelope plus the raw
/// payload. The payload stays untyped here; flows decide how tolerantly to
/// interpret it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    /// Document identifier.
    pub id: String,
    /// Record-creation instant, per the server clock.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Record-update instant, per the server clock.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// The document body.
    #[serde(default)]
    pub data: Value,
}

/// Seam over the managed document store, so flows can run against fakes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-generated identifier. The store
    /// assigns the creation/update timestamps from its own clock.
    async fn create(
        &self,
        collection: &str,
        document: Value,
    ) -> core::result::Result<DocumentRef, StoreError>;

    /// Create or replace the document with the given identifier.
    async fn put(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> core::result::Result<DocumentRef, StoreError>;

    /// Read one document by identifier.
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> core::result::Result<StoredDocument, StoreError>;

    /// Run a query against a collection.
    async fn query(
        &self,
        collection: &str,
        query: Query,
    ) -> core::result::Result<Vec<StoredDocument>, StoreError>;
}

/// HTTP client for the managed document store.
pub struct DocumentClient {
    /// Shared HTTP client.
    http: Client,
    /// Service base URL, without a trailing slash.
    base_url: String,
    /// Bearer token of the signed-in user, when any.
    token: Option<String>,
}

impl DocumentClient {
    /// Path prefix for collection endpoints.
    const COLLECTIONS_PATH: &'static str = "v1/collections";

    /// Create a client for an unauthenticated session.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach the bearer token issued at sign-in.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Endpoint for a collection's document list.
    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/{}/{collection}/documents",
            self.base_url.trim_end_matches('/'),
            Self::COLLECTIONS_PATH
        )
    }

    /// Endpoint for one document.
    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{id}", self.collection_url(collection))
    }

    /// Apply the bearer token, if present.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Classify a non-success HTTP status into the store taxonomy.
fn classify_status(status: StatusCode) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied,
        StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::BAD_GATEWAY
        | StatusCode::GATEWAY_TIMEOUT => StoreError::Unavailable,
        status => StoreError::Other(format!("unexpected status {status}")),
    }
}

/// Fail on non-success statuses, classified.
fn check(response: reqwest::Response) -> core::result::Result<reqwest::Response, StoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(classify_status(response.status()))
    }
}

#[async_trait]
impl DocumentStore for DocumentClient {
    async fn create(
        &self,
        collection: &str,
        document: Value,
    ) -> core::result::Result<DocumentRef, StoreError> {
        let request = self
            .authorize(self.http.post(self.collection_url(collection)))
            .json(&document);

        let response = check(request.send().await?)?;
        Ok(response.json().await?)
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> core::result::Result<DocumentRef, StoreError> {
        let request = self
            .authorize(self.http.put(self.document_url(collection, id)))
            .json(&document);

        let response = check(request.send().await?)?;
        Ok(response.json().await?)
    }

    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> core::result::Result<StoredDocument, StoreError> {
        let request = self.authorize(self.http.get(self.document_url(collection, id)));

        let response = check(request.send().await?)?;
        Ok(response.json().await?)
    }

    async fn query(
        &self,
        collection: &str,
        query: Query,
    ) -> core::result::Result<Vec<StoredDocument>, StoreError> {
        let mut request = self.authorize(self.http.get(self.collection_url(collection)));

        if let Some(field) = query.order_by {
            request = request.query(&[("orderBy", field)]);
            if query.descending {
                request = request.query(&[("direction", "desc")]);
            }
        }
        if let Some(limit) = query.limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        #[derive(Deserialize)]
        struct Response {
            documents: Vec<StoredDocument>,
        }

        let response = check(request.send().await?)?;
        let body: Response = response.json().await?;
        Ok(body.documents)
    }
}
