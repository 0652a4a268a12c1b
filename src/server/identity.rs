use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// A verified identity as issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned user identifier.
    pub uid: String,
    /// The account email, as the provider canonicalized it.
    pub email: String,
    /// Bearer token for authenticated store access.
    pub token: String,
}

/// Seam over the managed identity service, so auth flows can run against
/// fakes.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Register a new account and return its identity.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> core::result::Result<Identity, AuthError>;

    /// Verify credentials and return the identity.
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> core::result::Result<Identity, AuthError>;
}

/// HTTP client for the managed identity service.
pub struct IdentityClient {
    /// Shared HTTP client.
    http: Client,
    /// Service base URL, without a trailing slash.
    base_url: String,
    /// Project API key, appended to every call.
    api_key: String,
}

impl IdentityClient {
    /// Account-creation endpoint.
    const SIGN_UP_PATH: &'static str = "v1/accounts:signUp";
    /// Credential-verification endpoint.
    const SIGN_IN_PATH: &'static str = "v1/accounts:signInWithPassword";

    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Both identity operations share one wire shape; only the path differs.
    async fn credential_request(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> core::result::Result<Identity, AuthError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Request<'a> {
            email: &'a str,
            password: &'a str,
            return_secure_token: bool,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            local_id: String,
            email: String,
            id_token: String,
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            error: ErrorDetail,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: String,
        }

        let url = format!(
            "{}/{path}?key={}",
            self.base_url.trim_end_matches('/'),
            self.api_key
        );

        let response = self
            .http
            .post(url)
            .json(&Request {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            // The provider reports the reason as a code string in the body;
            // map it through the taxonomy table.
            return match response.json::<ErrorBody>().await {
                Ok(body) => Err(AuthError::from_provider_code(&body.error.message)),
                Err(_) => Err(AuthError::Other),
            };
        }

        let body: Response = response.json().await.map_err(|_| AuthError::Other)?;
        Ok(Identity {
            uid: body.local_id,
            email: body.email,
            token: body.id_token,
        })
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> core::result::Result<Identity, AuthError> {
        self.credential_request(Self::SIGN_UP_PATH, email, password)
            .await
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> core::result::Result<Identity, AuthError> {
        self.credential_request(Self::SIGN_IN_PATH, email, password)
            .await
    }
}
