//! Sign-up and sign-in flows.

use tracing::warn;

use crate::error::{Error, Result};
use crate::model::UserProfile;
use crate::server::{documents, DocumentStore, IdentityService};
use crate::session::{KeyValueStore, SessionSnapshot, SessionStore};

/// Everything the sign-up form collects.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    /// Full name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Chosen password.
    pub password: String,
    /// Password repeated for confirmation.
    pub confirm_password: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Postal code.
    pub zipcode: String,
}

impl SignUpForm {
    /// The profile document derived from the form; blank fields are omitted.
    fn profile(&self) -> UserProfile {
        let non_blank = |s: &String| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        UserProfile {
            name: non_blank(&self.name),
            phone: non_blank(&self.phone),
            address: non_blank(&self.address),
            city: non_blank(&self.city),
            state: non_blank(&self.state),
            zipcode: non_blank(&self.zipcode),
        }
    }
}

/// Client-side sign-in checks, run before any provider call.
pub fn validate_sign_in(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(Error::validation("email", "Email is required"));
    }
    if !is_plausible_email(email) {
        return Err(Error::validation("email", "Invalid email format"));
    }
    if password.is_empty() {
        return Err(Error::validation("password", "Password is required"));
    }
    if password.len() < 6 {
        return Err(Error::validation(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

/// Client-side sign-up checks, run before any provider call.
pub fn validate_sign_up(form: &SignUpForm) -> Result<()> {
    if form.password.len() < 6 {
        return Err(Error::validation(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    if form.password != form.confirm_password {
        return Err(Error::validation(
            "confirm_password",
            "Passwords do not match",
        ));
    }
    if !form.email.contains('@') {
        return Err(Error::validation("email", "Invalid email address"));
    }
    Ok(())
}

/// A cheap well-formedness check; the provider remains the authority on
/// whether the address is real.
fn is_plausible_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}

/// Runs account creation and sign-in end to end: validation, provider call,
/// profile document, session snapshot.
pub struct AuthFlow<'a, S: KeyValueStore> {
    /// Identity provider.
    identity: &'a dyn IdentityService,
    /// Document store holding `users` profiles.
    store: &'a dyn DocumentStore,
    /// Device-local session persistence.
    session: &'a SessionStore<S>,
}

impl<'a, S: KeyValueStore> AuthFlow<'a, S> {
    /// Build a flow over the given collaborators.
    pub fn new(
        identity: &'a dyn IdentityService,
        store: &'a dyn DocumentStore,
        session: &'a SessionStore<S>,
    ) -> Self {
        Self {
            identity,
            store,
            session,
        }
    }

    /// Create an account, write its profile document, and cache the session
    /// snapshot. A failed profile write is logged but does not fail the
    /// sign-up; the account already exists and the profile can be completed
    /// later.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SessionSnapshot> {
        validate_sign_up(form)?;

        let identity = self
            .identity
            .create_account(&form.email, &form.password)
            .await?;

        let profile = form.profile();
        let document =
            serde_json::to_value(&profile).map_err(|err| Error::Unknown(err.to_string()))?;
        if let Err(err) = self.store.put(documents::USERS, &identity.uid, document).await {
            warn!(error = %err, uid = %identity.uid, "could not write user profile");
        }

        let snapshot = SessionSnapshot {
            uid: identity.uid,
            email: identity.email,
            token: identity.token,
            profile,
        };
        self.session.save(&snapshot);
        Ok(snapshot)
    }

    /// Verify credentials, load the profile, and cache the session snapshot.
    /// A failed profile read degrades to an empty profile rather than
    /// failing the sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionSnapshot> {
        validate_sign_in(email, password)?;

        let identity = self.identity.sign_in(email, password).await?;

        let profile = match self.store.get(documents::USERS, &identity.uid).await {
            Ok(doc) => serde_json::from_value(doc.data).unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, uid = %identity.uid, "could not load user profile");
                UserProfile::default()
            }
        };

        let snapshot = SessionSnapshot {
            uid: identity.uid,
            email: identity.email,
            token: identity.token,
            profile,
        };
        self.session.save(&snapshot);
        Ok(snapshot)
    }

    /// Drop the cached session snapshot.
    pub fn sign_out(&self) {
        self.session.clear();
    }
}
