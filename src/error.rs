use thiserror::Error;

/// Result alias used across the crate's flows.
pub type Result<T> = core::result::Result<T, Error>;

/// Top-level failure taxonomy. Every collaborator failure is classified into
/// one of these before it crosses a flow boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// A client-detected input problem, attributed to the offending field.
    /// Always recoverable by the user editing the field.
    #[error("{field}: {message}")]
    Validation {
        /// Name of the field that failed validation.
        field: &'static str,
        /// Human-readable description of the problem.
        message: String,
    },

    /// Device location could not be acquired (permission or hardware).
    #[error("{0}")]
    LocationUnavailable(String),

    /// Identity-provider failure, already mapped to a fixed variant set.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Document-store failure, already classified.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Anything that escaped the classifications above.
    #[error("unexpected failure: {0}")]
    Unknown(String),
}

impl Error {
    /// Create a field-attributed validation error.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a location-acquisition error.
    pub fn location(message: impl Into<String>) -> Self {
        Self::LocationUnavailable(message.into())
    }

    /// The message to show the user in a blocking notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { message, .. } => message.clone(),
            Error::LocationUnavailable(message) => message.clone(),
            Error::Auth(err) => err.to_string(),
            Error::Store(err) => err.to_string(),
            Error::Unknown(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Identity-provider failures. The `Display` impl of each variant is the
/// fixed user-facing string for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The email is already registered.
    #[error("An account with this email already exists")]
    EmailInUse,
    /// The provider rejected the password as too weak.
    #[error("Password must be at least 6 characters")]
    WeakPassword,
    /// The provider rejected the email address.
    #[error("Invalid email format")]
    InvalidEmail,
    /// The account exists but has been disabled.
    #[error("This account has been disabled")]
    UserDisabled,
    /// No account matches the email.
    #[error("No account found with this email")]
    UserNotFound,
    /// The password does not match the account.
    #[error("Incorrect password")]
    WrongPassword,
    /// The provider is rate-limiting this client.
    #[error("Too many attempts. Please try again later")]
    TooManyRequests,
    /// The request never reached the provider.
    #[error("Network error. Please check your internet connection.")]
    Network,
    /// Unmapped provider failure.
    #[error("Authentication failed. Please try again.")]
    Other,
}

impl AuthError {
    /// Map a provider error code onto the taxonomy. Codes arrive as an
    /// upper-snake token, sometimes followed by prose
    /// (`"WEAK_PASSWORD : Password should be ..."`), so only the first token
    /// is matched. Flows never branch on the raw code strings directly.
    pub fn from_provider_code(code: &str) -> Self {
        let token = code.split([' ', ':']).next().unwrap_or_default();
        match token {
            "EMAIL_EXISTS" => AuthError::EmailInUse,
            "WEAK_PASSWORD" => AuthError::WeakPassword,
            "INVALID_EMAIL" => AuthError::InvalidEmail,
            "USER_DISABLED" => AuthError::UserDisabled,
            "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::WrongPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyRequests,
            _ => AuthError::Other,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AuthError::Network
        } else {
            AuthError::Other
        }
    }
}

/// Document-store failures, classified per the store contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The caller is not allowed to read or write the collection.
    #[error("permission denied")]
    PermissionDenied,
    /// The store could not be reached or is temporarily down.
    #[error("service unavailable")]
    Unavailable,
    /// Any other store-reported failure.
    #[error("store failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            StoreError::Unavailable
        } else {
            StoreError::Other(err.to_string())
        }
    }
}
