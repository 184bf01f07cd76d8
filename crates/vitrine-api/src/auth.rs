// Authentication and profile endpoints
//
// Login persists the returned token and user into the credential store;
// logout is purely local. Response shapes vary slightly between backend
// versions (`access_token` vs `token`, `user` vs `usuario`), so bodies
// are read as loose JSON and picked apart here.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{ApiClient, LOGIN_PATH};
use crate::error::{Error, ErrorKind};
use crate::models::{ProfilePatch, UserProfile};

const REGISTER_PATH: &str = "form";
const PROFILE_PATH: &str = "api/perfil";

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    senha: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    nome: &'a str,
    email: &'a str,
    senha: &'a str,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: Option<UserProfile>,
    /// Server greeting, if it sent one.
    pub message: Option<String>,
}

impl ApiClient {
    /// `POST /login`: exchange email + password for a bearer token.
    ///
    /// On success the token and user are persisted and the auth state
    /// flips to signed-in. A response without a token is treated as an
    /// authentication failure.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginOutcome, Error> {
        let body = LoginBody {
            email,
            senha: password.expose_secret(),
        };
        let resp: Value = self.post(LOGIN_PATH, &body).await?;

        let token = ["access_token", "token"]
            .iter()
            .find_map(|key| resp.get(key).and_then(Value::as_str))
            .filter(|t| !t.trim().is_empty())
            .map(|t| SecretString::from(t.to_owned()))
            .ok_or_else(|| Error::Authentication {
                message: message_of(&resp)
                    .unwrap_or_else(|| ErrorKind::Authentication.default_message().to_owned()),
            })?;

        let user = match ["user", "usuario"].iter().find_map(|key| resp.get(key)) {
            Some(raw) => Some(user_from(raw.clone())?),
            None => None,
        };

        self.credentials().save(&token, user.as_ref())?;
        self.mark_signed_in();
        info!(email, "logged in");

        Ok(LoginOutcome {
            user,
            message: message_of(&resp),
        })
    }

    /// `POST /form`: create an account. Returns the server's message.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<String>, Error> {
        let body = RegisterBody {
            nome: name,
            email,
            senha: password.expose_secret(),
        };
        let resp: Value = self.post(REGISTER_PATH, &body).await?;
        debug!(email, "account registered");
        Ok(message_of(&resp))
    }

    /// Forget the local session. No network call is made.
    pub fn logout(&self) -> Result<(), Error> {
        self.credentials().clear()?;
        self.mark_signed_out();
        info!("logged out");
        Ok(())
    }

    /// `GET /api/perfil`: fetch the current user and persist it.
    pub async fn profile(&self) -> Result<UserProfile, Error> {
        let resp: Value = self.get(PROFILE_PATH).await?;
        let user = user_from(unwrap_user(resp))?;
        self.credentials().set_user(&user)?;
        Ok(user)
    }

    /// `PUT /api/perfil`: update name/email and persist the result.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<UserProfile, Error> {
        let resp: Value = self.put(PROFILE_PATH, patch).await?;
        let user = user_from(unwrap_user(resp))?;
        self.credentials().set_user(&user)?;
        Ok(user)
    }
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(str::to_owned)
}

/// Accept `{user: {...}}`, `{usuario: {...}}` or a bare profile.
fn unwrap_user(body: Value) -> Value {
    match body {
        Value::Object(mut map) => {
            for key in ["user", "usuario"] {
                if let Some(inner @ Value::Object(_)) = map.remove(key) {
                    return inner;
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn user_from(raw: Value) -> Result<UserProfile, Error> {
    serde_json::from_value(raw.clone()).map_err(|e| Error::Deserialization {
        message: format!("invalid user profile: {e}"),
        body: raw.to_string(),
    })
}
