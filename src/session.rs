use crate::ui::feedback::Toast;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use std::{collections::HashMap, convert::Infallible, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "taskpulse_sid";
pub const VISITOR_COOKIE: &str = "taskpulse_visitor";
const VISITOR_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

/// Who is signed in for the current browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity token could not be decoded: {0}")]
    Undecodable(String),
    #[error("identity token carries no email")]
    MissingEmail,
}

#[derive(Debug, Deserialize)]
struct IdentityClaims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Reads email and display name from a provider-issued identity token.
/// The token is taken at face value: the signature is not checked here.
pub fn decode_identity_token(token: &str) -> Result<Identity, IdentityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let dummy_key = DecodingKey::from_secret(b"unused");
    let data = decode::<IdentityClaims>(token.trim(), &dummy_key, &validation)
        .map_err(|err| IdentityError::Undecodable(err.to_string()))?;

    let email = data
        .claims
        .email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .ok_or(IdentityError::MissingEmail)?;
    let name = data
        .claims
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    Ok(Identity { email, name })
}

#[derive(Debug, Default)]
struct SessionEntry {
    identity: Option<Identity>,
    flash: Vec<Toast>,
}

/// Session-scoped state: the signed-in identity and toasts queued for the
/// next rendered page.
#[derive(Clone, Default)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn identity(&self, session_id: &str) -> Option<Identity> {
        let entries = self.entries.lock().await;
        entries
            .get(session_id)
            .and_then(|entry| entry.identity.clone())
    }

    pub async fn sign_in(&self, session_id: &str, identity: Identity) {
        let mut entries = self.entries.lock().await;
        entries.entry(session_id.to_string()).or_default().identity = Some(identity);
    }

    /// Forgets the identity. Returns whether anyone was signed in; only then
    /// is the entry kept so a farewell toast can still be flashed to it.
    pub async fn sign_out(&self, session_id: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(session_id) else {
            return false;
        };
        let signed_in = entry.identity.take().is_some();
        if !signed_in && entry.flash.is_empty() {
            entries.remove(session_id);
        }
        signed_in
    }

    /// Queues a toast for a known session. Toasts for sessions the store has
    /// never seen are dropped, so unknown cookies cannot grow the store.
    pub async fn push_flash(&self, session_id: &str, toast: Toast) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(session_id) {
            Some(entry) => {
                entry.flash.push(toast);
                true
            }
            None => false,
        }
    }

    pub async fn take_flash(&self, session_id: &str) -> Vec<Toast> {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(session_id) else {
            return Vec::new();
        };
        let flash = std::mem::take(&mut entry.flash);
        if entry.identity.is_none() {
            entries.remove(session_id);
        }
        flash
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

fn cookie_id(headers: &HeaderMap, name: &str) -> Option<String> {
    read_cookie(headers, name)
        .and_then(|value| Uuid::parse_str(&value).ok())
        .map(|id| id.to_string())
}

/// Browser identifiers for the current request. Missing ids are minted on
/// the spot and handed back to the browser through [`Visit::respond`].
#[derive(Debug, Clone)]
pub struct Visit {
    pub session_id: String,
    pub visitor_id: String,
    new_cookies: Vec<String>,
}

impl Visit {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut new_cookies = Vec::new();

        let session_id = cookie_id(headers, SESSION_COOKIE).unwrap_or_else(|| {
            let id = Uuid::new_v4().to_string();
            new_cookies.push(format!(
                "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"
            ));
            id
        });

        let visitor_id = cookie_id(headers, VISITOR_COOKIE).unwrap_or_else(|| {
            let id = Uuid::new_v4().to_string();
            new_cookies.push(format!(
                "{VISITOR_COOKIE}={id}; Path=/; Max-Age={VISITOR_MAX_AGE_SECS}; HttpOnly; SameSite=Lax"
            ));
            id
        });

        Self {
            session_id,
            visitor_id,
            new_cookies,
        }
    }

    pub fn respond(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        for cookie in &self.new_cookies {
            if let Ok(value) = HeaderValue::from_str(cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Visit
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Visit::from_headers(&parts.headers))
    }
}
