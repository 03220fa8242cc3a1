//! Client side of the finance tracker: session guard, credential storage,
//! the authenticated API client and request fencing.
//!
//! Filtering of the fetched collections lives in the `engine` crate.

pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod local_state;
pub mod sequence;
pub mod session;

pub use client::{ApiClient, ClientError};
pub use error::{AppError, Result};
pub use guard::{RouteDecision, SessionGuard, SessionState};
pub use local_state::FileStore;
pub use sequence::{CollectionView, RequestSequence, Ticket};
pub use session::{Credential, CredentialStore, MemoryStore};
