// Catalog backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, per-call bearer
// attachment from the credential store, and status classification.
// Endpoint groups (auth, catalog, dashboard) are inherent methods in
// sibling modules so this file stays focused on transport mechanics.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, trace, warn};
use url::Url;

use crate::credentials::CredentialStore;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Path of the login endpoint. A 401 here means "wrong password", not
/// "session expired", so it never raises [`AuthState::LoginRequired`].
pub(crate) const LOGIN_PATH: &str = "login";

/// Session state as seen by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No credentials and nobody asked for them yet.
    SignedOut,
    /// A token was stored by a successful login.
    SignedIn,
    /// The backend rejected the session; the consumer should prompt for login.
    LoginRequired,
}

/// Raw HTTP client for the catalog backend.
///
/// Cheap to share behind an `Arc`. Credential state is read at call time,
/// so a logout or a 401 affects the very next request.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialStore,
    auth_state: watch::Sender<AuthState>,
}

impl ApiClient {
    /// Build a client from a transport config.
    ///
    /// `base_url` is the backend root (e.g. `http://localhost:5000`);
    /// request paths are joined onto it.
    pub fn new(
        base_url: Url,
        transport: &TransportConfig,
        credentials: CredentialStore,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: CredentialStore) -> Self {
        let initial = match credentials.is_authenticated() {
            Ok(true) => AuthState::SignedIn,
            Ok(false) => AuthState::SignedOut,
            Err(e) => {
                warn!(error = %e, "could not read stored credentials");
                AuthState::SignedOut
            }
        };
        let (auth_state, _) = watch::channel(initial);
        Self {
            http,
            base_url: normalize_base(base_url),
            credentials,
            auth_state,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Subscribe to session state changes.
    pub fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.auth_state.subscribe()
    }

    pub fn current_auth_state(&self) -> AuthState {
        *self.auth_state.borrow()
    }

    pub(crate) fn mark_signed_in(&self) {
        self.auth_state.send_replace(AuthState::SignedIn);
    }

    pub(crate) fn mark_signed_out(&self) {
        self.auth_state.send_replace(AuthState::SignedOut);
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join a relative path onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.get_with_query(path, &[]).await
    }

    /// Send a GET request with query parameters.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let body = self.send(Method::GET, url, path, None::<&()>).await?;
        decode(body)
    }

    /// Send a POST request with JSON body.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        let body = self.send(Method::POST, url, path, Some(body)).await?;
        decode(body)
    }

    /// Send a PUT request with JSON body.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        let body = self.send(Method::PUT, url, path, Some(body)).await?;
        decode(body)
    }

    /// Send a DELETE request. Any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        self.send(Method::DELETE, url, path, None::<&()>).await?;
        Ok(())
    }

    /// Execute one request and return the raw success body.
    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: Url,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, Error> {
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let sent_token = self.credentials.token()?;
        if let Some(token) = &sent_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Client(format!("invalid bearer token: {e}")))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        let resp = builder.send().await.map_err(Error::connection)?;
        let status = resp.status();
        let text = resp.text().await.map_err(Error::connection)?;

        if status.is_success() {
            trace!(status = status.as_u16(), bytes = text.len(), "response");
            return Ok(text);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(path, sent_token.as_ref());
        }

        Err(Error::from_status(status.as_u16(), server_message(&text)))
    }

    /// Clear credentials and raise the login-required signal.
    ///
    /// Only the first of several concurrent 401s changes anything; the
    /// rest observe `LoginRequired` already set and return untouched.
    /// A 401 for a request sent before a newer login leaves that login
    /// alone.
    fn handle_unauthorized(&self, path: &str, sent_token: Option<&SecretString>) {
        if path.trim_start_matches('/') == LOGIN_PATH {
            return;
        }
        if self.session_replaced(sent_token) {
            debug!("ignoring 401 for a session that has since been replaced");
            return;
        }
        let credentials = &self.credentials;
        let changed = self.auth_state.send_if_modified(|state| {
            if *state == AuthState::LoginRequired {
                return false;
            }
            if let Err(e) = credentials.clear() {
                warn!(error = %e, "failed to clear credentials after 401");
            }
            *state = AuthState::LoginRequired;
            true
        });
        if changed {
            warn!("backend rejected the session, login required");
        }
    }

    /// Whether the stored token differs from the one a request carried.
    fn session_replaced(&self, sent_token: Option<&SecretString>) -> bool {
        let current = match self.credentials.token() {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "could not read stored credentials");
                return false;
            }
        };
        match (sent_token, current) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(sent), Some(current)) => sent.expose_secret() != current.expose_secret(),
        }
    }
}

/// Ensure the base URL ends with `/` so `join` appends instead of replacing
/// the last segment.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Pull the human-readable message out of an error body, if any.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}

/// Decode a success body. An empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    let raw = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(raw).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
