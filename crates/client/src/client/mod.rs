use std::time::Duration;

use api_types::{
    ErrorResponse,
    group::{Group, GroupsResponse},
    receipt::{Receipt, ReceiptsResponse},
    subscription::{Subscription, SubscriptionsResponse},
    user::{LoginRequest, RegisterRequest, RegisterResponse, TokenPair, User},
};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    error::{AppError, Result},
    guard::SessionGuard,
    session::{CredentialStore, StoreError},
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// A 401 on an authenticated call; the credential is already gone.
    #[error("session expired")]
    Unauthorized,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("bad request: {0}")]
    BadRequest(String),
    /// 409 on registration: the username is taken.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The body arrived but is not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

impl ClientError {
    /// Message fit for showing to the user as is.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Your session has expired. Please log in again.",
            Self::InvalidCredentials => "Incorrect username or password. Please try again.",
            Self::BadRequest(_) => "Please check your input and try again.",
            Self::Conflict(_) => "Username is already taken.",
            Self::Network(_) => {
                "Unable to connect to the server. Please check your internet connection."
            }
            Self::Decode(_) => "The server sent an unexpected response. Please try again later.",
            Self::Server { .. } | Self::Store(_) => "An error occurred. Please try again later.",
        }
    }
}

/// HTTP client for the finance API. Authenticated calls go through the
/// [`SessionGuard`]; nothing is retried.
#[derive(Debug)]
pub struct ApiClient<S> {
    base_url: Url,
    http: reqwest::Client,
    guard: SessionGuard<S>,
}

impl<S: CredentialStore> ApiClient<S> {
    pub fn new(base_url: &str, timeout: Duration, guard: SessionGuard<S>) -> Result<Self> {
        // `Url::join` replaces the last segment unless the base ends with '/'.
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&base_url)
            .map_err(|err| AppError::Invalid(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http,
            guard,
        })
    }

    pub fn guard(&self) -> &SessionGuard<S> {
        &self.guard
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url.join(path).map_err(|err| ClientError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("invalid endpoint {path}: {err}"),
        })
    }

    /// Send through the guard; a 401 becomes [`ClientError::Unauthorized`].
    pub async fn fetch_with_auth(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<reqwest::Response, ClientError> {
        let response = self.guard.attach_auth(request).send().await?;
        self.guard
            .handle_response(response)
            .ok_or(ClientError::Unauthorized)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ClientError> {
        let endpoint = self.endpoint(path)?;
        let res = self.fetch_with_auth(self.http.get(endpoint)).await?;
        if res.status().is_success() {
            return decode(res).await;
        }
        Err(error_from_response(res).await)
    }

    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> std::result::Result<(), ClientError> {
        let endpoint = self.endpoint("user/login/")?;
        let payload = LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };

        let res = self.http.post(endpoint).json(&payload).send().await?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }

        let tokens: TokenPair = decode(res).await?;
        self.guard.login(&tokens.access)?;
        Ok(())
    }

    /// Create an account. Does not log in; returns the registered username.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> std::result::Result<String, ClientError> {
        let endpoint = self.endpoint("user/register/")?;
        let res = self.http.post(endpoint).json(request).send().await?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }

        let body: RegisterResponse = decode(res).await?;
        tracing::info!(username = %body.user.username, "account registered");
        Ok(body.user.username)
    }

    /// Tell the server, then forget the credential whatever it answered.
    pub async fn logout(&self) -> std::result::Result<(), ClientError> {
        if self.guard.is_authenticated() {
            let endpoint = self.endpoint("user/logout/")?;
            match self.fetch_with_auth(self.http.post(endpoint)).await {
                Ok(res) if !res.status().is_success() => {
                    tracing::warn!(status = %res.status(), "server-side logout failed");
                }
                Ok(_) | Err(ClientError::Unauthorized) => {}
                Err(err) => tracing::warn!("server-side logout failed: {err}"),
            }
        }
        self.guard.logout()?;
        Ok(())
    }

    pub async fn me(&self) -> std::result::Result<User, ClientError> {
        self.get_json("user/me/").await
    }

    pub async fn groups(&self) -> std::result::Result<Vec<Group>, ClientError> {
        let body: GroupsResponse = self.get_json("groups/").await?;
        Ok(body.groups)
    }

    pub async fn receipts(&self) -> std::result::Result<Vec<Receipt>, ClientError> {
        let body: ReceiptsResponse = self.get_json("receipts/").await?;
        Ok(body.receipts)
    }

    pub async fn subscriptions(&self) -> std::result::Result<Vec<Subscription>, ClientError> {
        let body: SubscriptionsResponse = self.get_json("subscriptions/").await?;
        Ok(body.subscriptions)
    }
}

async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> std::result::Result<T, ClientError> {
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Decode)
}

async fn error_from_response(res: reqwest::Response) -> ClientError {
    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());

    match status {
        StatusCode::UNAUTHORIZED => ClientError::InvalidCredentials,
        StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
        StatusCode::CONFLICT => ClientError::Conflict(body),
        _ => ClientError::Server {
            status,
            message: body,
        },
    }
}
