// ── Auth store ──
//
// Session-level account actions. The credential store is the only
// source of truth for "who is logged in"; nothing is cached here, so a
// 401 that clears credentials is visible on the next read.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use vitrine_api::{ApiClient, AuthState, ErrorKind, ProfilePatch, UserProfile};

use crate::error::CoreError;
use crate::model::Severity;
use crate::notify::Notifier;
use crate::validation::{Validate, validate_login, validate_registration};

/// Name shown when no profile is stored.
pub const ANONYMOUS_NAME: &str = "User";
const INVALID_CREDENTIALS: &str = "Invalid email or password.";

pub struct AuthStore {
    client: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
}

impl AuthStore {
    pub fn new(client: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn is_authenticated(&self) -> bool {
        self.client.credentials().is_authenticated().unwrap_or(false)
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.client.credentials().user().ok().flatten()
    }

    pub fn display_name(&self) -> String {
        self.user()
            .map(|u| u.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_owned())
    }

    pub fn email(&self) -> String {
        self.user().map(|u| u.email).unwrap_or_default()
    }

    /// Fires `LoginRequired` when the backend rejects the session.
    pub fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.client.auth_state()
    }

    // ── Actions ──────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Option<UserProfile>, CoreError> {
        validate_login(email, password).map_err(|e| self.report(e))?;
        match self.client.login(email.trim(), password).await {
            Ok(outcome) => {
                self.notifier.notify("Login successful!", Severity::Success);
                Ok(outcome.user)
            }
            Err(err) => {
                let mut err = CoreError::from(err);
                if let CoreError::Authentication { message } = &mut err {
                    if message == ErrorKind::Authentication.default_message() {
                        INVALID_CREDENTIALS.clone_into(message);
                    }
                }
                Err(self.report(err))
            }
        }
    }

    /// Create an account, then log straight into it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<UserProfile>, CoreError> {
        validate_registration(name, email, password).map_err(|e| self.report(e))?;
        self.client
            .register(name.trim(), email.trim(), password)
            .await
            .map_err(|e| self.report(e.into()))?;
        self.notifier.notify("Registration successful!", Severity::Success);
        self.login(email, password).await
    }

    /// Local only: clears credentials and announces it.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.client.logout()?;
        self.notifier.notify("Logged out successfully!", Severity::Info);
        Ok(())
    }

    /// Re-fetch the profile. Errors propagate without a notification.
    pub async fn refresh_profile(&self) -> Result<UserProfile, CoreError> {
        Ok(self.client.profile().await?)
    }

    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<UserProfile, CoreError> {
        patch.validate().map_err(|e| self.report(e))?;
        let user = self
            .client
            .update_profile(patch)
            .await
            .map_err(|e| self.report(e.into()))?;
        self.notifier.notify("Profile updated successfully!", Severity::Success);
        Ok(user)
    }

    fn report(&self, err: CoreError) -> CoreError {
        self.notifier.notify(err.user_message(), Severity::Error);
        err
    }
}
