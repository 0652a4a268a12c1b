//! Backend endpoint configuration.

use std::env;

/// Where the managed services live. Resolved once at startup from the
/// environment, with CLI flags taking precedence over both.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the managed identity service.
    pub identity_url: String,
    /// Base URL of the managed document store.
    pub store_url: String,
    /// Project API key sent with identity calls.
    pub api_key: String,
}

impl BackendConfig {
    /// Default identity endpoint: the local emulator.
    pub const DEFAULT_IDENTITY_URL: &str = "http://localhost:9099";
    /// Default store endpoint: the local emulator.
    pub const DEFAULT_STORE_URL: &str = "http://localhost:8080";
    /// API key accepted by the local emulators.
    pub const DEFAULT_API_KEY: &str = "dev";

    /// Read the configuration from `WILDTRACK_IDENTITY_URL`,
    /// `WILDTRACK_STORE_URL` and `WILDTRACK_API_KEY`, falling back to the
    /// local-emulator defaults.
    pub fn from_env() -> Self {
        Self {
            identity_url: env::var("WILDTRACK_IDENTITY_URL")
                .unwrap_or_else(|_| Self::DEFAULT_IDENTITY_URL.to_string()),
            store_url: env::var("WILDTRACK_STORE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_STORE_URL.to_string()),
            api_key: env::var("WILDTRACK_API_KEY")
                .unwrap_or_else(|_| Self::DEFAULT_API_KEY.to_string()),
        }
    }
}
