// ── Credential store ──
//
// Bearer token and user profile in durable key/value storage. Pure data:
// nothing here touches the network. The transport reads the token from
// here on every request, so clearing it takes effect immediately.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Error;
use crate::models::UserProfile;

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key holding the JSON-encoded [`UserProfile`].
pub const USER_KEY: &str = "user_data";
/// Storage key holding the UI theme (`light` / `dark`).
pub const THEME_KEY: &str = "app_theme";

// ── Key/value contract ──────────────────────────────────────────────

/// Minimal durable string storage. Key names and the JSON encoding of
/// stored values are part of the compatibility surface.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// Process-local storage; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// A single JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A missing file is an empty store. A corrupt file is logged and
    /// treated as empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "storage file unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("failed to create {}: {e}", parent.display())))?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::Storage(format!("failed to encode storage: {e}")))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| Error::Storage(format!("failed to write {}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

fn poisoned() -> Error {
    Error::Storage("storage lock poisoned".into())
}

// ── Credentials ─────────────────────────────────────────────────────

/// Token + profile accessor over a [`KeyValueStore`].
///
/// The user profile is only reported while a usable token exists; an
/// expired token (per its `exp` claim) counts as no token at all.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The underlying key/value storage (shared with UI preferences).
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// The current bearer token, or `None` if absent or expired.
    pub fn token(&self) -> Result<Option<SecretString>, Error> {
        let Some(raw) = self.storage.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        if token_expired(&raw, Utc::now()) {
            debug!("stored token has expired, treating as absent");
            return Ok(None);
        }
        Ok(Some(SecretString::from(raw)))
    }

    /// The stored profile, only while a usable token is present.
    pub fn user(&self) -> Result<Option<UserProfile>, Error> {
        if self.token()?.is_none() {
            return Ok(None);
        }
        let Some(raw) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "stored user profile is corrupt, ignoring");
                Ok(None)
            }
        }
    }

    pub fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(self.token()?.is_some())
    }

    /// Persist a fresh login.
    pub fn save(&self, token: &SecretString, user: Option<&UserProfile>) -> Result<(), Error> {
        self.storage.set(TOKEN_KEY, token.expose_secret())?;
        match user {
            Some(user) => self.set_user(user),
            None => self.storage.remove(USER_KEY),
        }
    }

    /// Replace the stored profile (profile refresh / update).
    pub fn set_user(&self, user: &UserProfile) -> Result<(), Error> {
        let raw = serde_json::to_string(user)
            .map_err(|e| Error::Storage(format!("failed to encode user profile: {e}")))?;
        self.storage.set(USER_KEY, &raw)
    }

    /// Forget token and profile. Idempotent.
    pub fn clear(&self) -> Result<(), Error> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)
    }
}

// ── Token claims ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// Whether a JWT's embedded `exp` claim lies at or before `now`.
///
/// Only the payload is decoded; the signature is the server's business.
/// Tokens that are not JWTs or carry no `exp` are never considered
/// expired here, leaving the server's 401 as the final word.
pub fn token_expired(token: &str, now: DateTime<Utc>) -> bool {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return false;
    };
    let Ok(claims) = serde_json::from_slice::<ExpiryClaim>(&bytes) else {
        return false;
    };
    claims.exp.is_some_and(|exp| exp <= now.timestamp())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::EntityId;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"1","exp":{exp}}}"#));
        format!("{header}.{payload}.signature")
    }

    fn user() -> UserProfile {
        UserProfile {
            id: EntityId::Number(1),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            created_at: None,
        }
    }

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn expired_token_is_absent() {
        let creds = store();
        let past = Utc::now().timestamp() - 60;
        creds
            .save(&SecretString::from(jwt_with_exp(past)), Some(&user()))
            .unwrap();

        assert!(creds.token().unwrap().is_none());
        assert!(creds.user().unwrap().is_none(), "user requires a live token");
    }

    #[test]
    fn live_token_and_user_round_trip() {
        let creds = store();
        let future = Utc::now().timestamp() + 3600;
        creds
            .save(&SecretString::from(jwt_with_exp(future)), Some(&user()))
            .unwrap();

        assert!(creds.is_authenticated().unwrap());
        assert_eq!(creds.user().unwrap().unwrap().name, "Ana");
    }

    #[test]
    fn opaque_token_is_trusted() {
        let creds = store();
        creds.save(&SecretString::from("opaque".to_owned()), None).unwrap();
        assert!(creds.is_authenticated().unwrap());
        assert!(creds.user().unwrap().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let creds = store();
        creds.save(&SecretString::from("t".to_owned()), Some(&user())).unwrap();
        creds.clear().unwrap();
        creds.clear().unwrap();
        assert!(creds.token().unwrap().is_none());
        assert!(creds.storage().get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn user_is_stored_as_json_string() {
        let creds = store();
        creds.save(&SecretString::from("t".to_owned()), Some(&user())).unwrap();
        let raw = creds.storage().get(USER_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["nome"], "Ana");
        assert_eq!(value["email"], "ana@example.com");
    }

    #[test]
    fn file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(THEME_KEY, "dark").unwrap();
        storage.remove(THEME_KEY).unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert!(reopened.get(THEME_KEY).unwrap().is_none());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn token_expired_ignores_garbage() {
        let now = Utc::now();
        assert!(!token_expired("not-a-jwt", now));
        assert!(!token_expired("a.!!!.c", now));
        assert!(token_expired(&jwt_with_exp(now.timestamp()), now));
    }
}
