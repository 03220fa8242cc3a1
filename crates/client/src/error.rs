use thiserror::Error;

use crate::{client::ClientError, session::StoreError};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Client(#[from] ClientError),
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
    #[error("filter error: {0}")]
    Filter(#[from] engine::EngineError),
    #[error("invalid setting: {0}")]
    Invalid(String),
}
