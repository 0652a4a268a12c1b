//! The flows that tie drafts, the session snapshot, and the remote services
//! together. Each flow issues at most one outstanding request at a time and
//! classifies every collaborator failure before returning it.

/// Sign-up and sign-in.
pub mod auth;
/// Recent-incident and resource retrieval.
pub mod fetch;
/// One-shot fit-to-bounds viewport computation.
pub mod map;
/// Incident report submission.
pub mod submit;

#[cfg(test)]
pub(crate) mod testing {
    //! Fakes for the service seams, shared by the flow tests.

    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::Value;

    use crate::error::{AuthError, StoreError};
    use crate::server::{DocumentRef, DocumentStore, Identity, IdentityService, Query, StoredDocument};

    /// A document store that records every call and answers from canned
    /// data, or fails every call when `fail_with` is set.
    #[derive(Default)]
    pub struct RecordingStore {
        /// `(collection, document)` per create call.
        pub created: Mutex<Vec<(String, Value)>>,
        /// `(collection, id, document)` per put call.
        pub puts: Mutex<Vec<(String, String, Value)>>,
        /// `(collection, query)` per query call.
        pub queries: Mutex<Vec<(String, Query)>>,
        /// Documents returned from queries.
        pub query_result: Mutex<Vec<StoredDocument>>,
        /// Document returned from gets.
        pub get_result: Mutex<Option<StoredDocument>>,
        /// When set, every call fails with a clone of this.
        pub fail_with: Option<StoreError>,
    }

    impl RecordingStore {
        pub fn failing(error: StoreError) -> Self {
            Self {
                fail_with: Some(error),
                ..Self::default()
            }
        }

        pub fn with_documents(documents: Vec<StoredDocument>) -> Self {
            Self {
                query_result: Mutex::new(documents),
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            match &self.fail_with {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn create(
            &self,
            collection: &str,
            document: Value,
        ) -> Result<DocumentRef, StoreError> {
            self.check()?;
            self.created
                .lock()
                .unwrap()
                .push((collection.to_string(), document));
            Ok(DocumentRef {
                id: uuid::Uuid::new_v4().to_string(),
                created_at: Some(Utc::now()),
                updated_at: Some(Utc::now()),
            })
        }

        async fn put(
            &self,
            collection: &str,
            id: &str,
            document: Value,
        ) -> Result<DocumentRef, StoreError> {
            self.check()?;
            self.puts
                .lock()
                .unwrap()
                .push((collection.to_string(), id.to_string(), document));
            Ok(DocumentRef {
                id: id.to_string(),
                created_at: Some(Utc::now()),
                updated_at: Some(Utc::now()),
            })
        }

        async fn get(
            &self,
            _collection: &str,
            _id: &str,
        ) -> Result<StoredDocument, StoreError> {
            self.check()?;
            self.get_result
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| StoreError::Other("no such document".to_string()))
        }

        async fn query(
            &self,
            collection: &str,
            query: Query,
        ) -> Result<Vec<StoredDocument>, StoreError> {
            self.check()?;
            self.queries
                .lock()
                .unwrap()
                .push((collection.to_string(), query));
            Ok(self.query_result.lock().unwrap().clone())
        }
    }

    /// An identity service that answers every call with one canned outcome.
    pub struct FakeIdentity {
        /// Outcome of both operations.
        pub outcome: Result<Identity, AuthError>,
    }

    impl FakeIdentity {
        pub fn succeeding(uid: &str, email: &str) -> Self {
            Self {
                outcome: Ok(Identity {
                    uid: uid.to_string(),
                    email: email.to_string(),
                    token: "test-token".to_string(),
                }),
            }
        }

        pub fn failing(error: AuthError) -> Self {
            Self {
                outcome: Err(error),
            }
        }
    }

    #[async_trait]
    impl IdentityService for FakeIdentity {
        async fn create_account(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<Identity, AuthError> {
            self.outcome.clone()
        }

        async fn sign_in(&self, _email: &str, _password: &str) -> Result<Identity, AuthError> {
            self.outcome.clone()
        }
    }
}
