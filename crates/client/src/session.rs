//! Access credential and where it is kept.
//!
//! The credential behaves like the browser cookie it replaces: named
//! `accessToken`, valid for one day, `SameSite=Strict`, `Secure` when the
//! deployment asks for it. An expired or empty credential counts as
//! absent.
//!
//! Stores serialise access within one process only. Two processes sharing
//! a [`FileStore`](crate::local_state::FileStore) can still overwrite each
//! other's login or logout, the same way two browser tabs can.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Lifetime of a freshly issued credential.
pub const CREDENTIAL_TTL: Duration = Duration::days(1);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("empty access token")]
    EmptyToken,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub same_site: SameSite,
    pub secure: bool,
}

impl Credential {
    /// Issue a strict, one-day access credential starting at `now`.
    pub fn issue(token: impl Into<String>, secure: bool, now: DateTime<Utc>) -> Self {
        Self {
            name: ACCESS_TOKEN_COOKIE.to_string(),
            token: token.into(),
            expires_at: now + CREDENTIAL_TTL,
            same_site: SameSite::Strict,
            secure,
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }

    /// Render as a `Set-Cookie` header value.
    pub fn set_cookie_header(&self) -> String {
        let mut header = format!(
            "{}={}; Expires={}; Path=/; SameSite={}",
            self.name,
            self.token,
            self.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.same_site.as_str()
        );
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

// The token never reaches logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("same_site", &self.same_site)
            .field("secure", &self.secure)
            .finish()
    }
}

/// Single mutable cell holding the current credential.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<Credential>;
    fn set(&self, credential: Credential) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<S> {
    fn get(&self) -> Option<Credential> {
        (**self).get()
    }

    fn set(&self, credential: Credential) -> Result<(), StoreError> {
        (**self).set(credential)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Process-local store; the session ends with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cell: Mutex<Option<Credential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Option<Credential> {
        self.cell.lock().clone()
    }

    fn set(&self, credential: Credential) -> Result<(), StoreError> {
        *self.cell.lock() = Some(credential);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.cell.lock().take();
        Ok(())
    }
}
