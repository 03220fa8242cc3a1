//! Session guard: gates protected routes and API calls on the stored
//! credential.
//!
//! The session is `Anonymous` until a login stores a credential, and goes
//! back to `Anonymous` on logout or on any `401 Unauthorized` seen by
//! [`SessionGuard::handle_response`]. Both transitions can repeat any
//! number of times.

use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode, Url};

use crate::session::{Credential, CredentialStore, StoreError};

pub const LOGIN_PATH: &str = "/login";
pub const PUBLIC_PATHS: [&str; 2] = [LOGIN_PATH, "/register"];
/// Where a login lands when no `from` destination was carried over.
pub const DEFAULT_LANDING: &str = "/dashboard";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Go to this location (login page with the requested path in `from`).
    Redirect(String),
}

/// What the guard needs to inspect on an API response.
pub trait ApiResponse {
    fn status(&self) -> StatusCode;
}

impl ApiResponse for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }
}

#[derive(Debug)]
pub struct SessionGuard<S> {
    store: S,
    secure: bool,
}

impl<S: CredentialStore> SessionGuard<S> {
    /// `secure` marks issued credentials as HTTPS-only (production).
    pub fn new(store: S, secure: bool) -> Self {
        Self { store, secure }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn live_credential(&self) -> Option<Credential> {
        self.store.get().filter(|c| c.is_live(Utc::now()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.live_credential().is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Store the access token returned by a successful login.
    pub fn login(&self, token: &str) -> Result<(), StoreError> {
        if token.is_empty() {
            return Err(StoreError::EmptyToken);
        }
        self.store
            .set(Credential::issue(token, self.secure, Utc::now()))?;
        tracing::info!("session authenticated");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear()?;
        tracing::info!("session cleared");
        Ok(())
    }

    /// Add `Authorization: Bearer <token>`.
    ///
    /// Without a credential the bearer value is empty and the server is
    /// expected to answer 401.
    pub fn attach_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.live_credential().map(|c| c.token).unwrap_or_default();
        request.bearer_auth(token)
    }

    /// Swallow a 401: clear the credential and return `None`, which the
    /// caller must treat as "logged out". Anything else passes through.
    pub fn handle_response<R: ApiResponse>(&self, response: R) -> Option<R> {
        if response.status() != StatusCode::UNAUTHORIZED {
            return Some(response);
        }
        tracing::warn!("api answered 401, dropping stored credential");
        if let Err(err) = self.store.clear() {
            tracing::error!("failed to clear credential after 401: {err}");
        }
        None
    }

    pub fn guard_route(&self, path: &str) -> RouteDecision {
        if is_public(path) || self.is_authenticated() {
            return RouteDecision::Allow;
        }
        tracing::debug!(path, "anonymous access to protected route");
        RouteDecision::Redirect(login_redirect(path))
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&normalize(path))
}

/// Login location carrying `path` in the `from` query parameter.
pub fn login_redirect(path: &str) -> String {
    let mut url = match Url::parse("http://localhost") {
        Ok(url) => url,
        Err(_) => return LOGIN_PATH.to_string(),
    };
    url.set_path(LOGIN_PATH);
    url.query_pairs_mut().append_pair("from", path);
    match url.query() {
        Some(query) => format!("{LOGIN_PATH}?{query}"),
        None => LOGIN_PATH.to_string(),
    }
}

/// Destination after a successful login.
///
/// Only local absolute paths are honoured; anything else (missing,
/// another host, a public page) lands on [`DEFAULT_LANDING`]. Browsers
/// read `\` as `/`, so any backslash is refused as well.
pub fn return_path(from: Option<&str>) -> String {
    match from.map(str::trim) {
        Some(path) if is_local_path(path) && !is_public(path) => path.to_string(),
        _ => DEFAULT_LANDING.to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}
