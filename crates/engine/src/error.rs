//! Errors raised while building [`FilterCriteria`] from user input.
//!
//! The filter pass itself never fails: records it cannot interpret are
//! excluded instead. These errors only come from turning raw strings
//! (command-line flags, drop-down labels) into typed criteria.
//!
//!  [`FilterCriteria`]: super::FilterCriteria
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown category: \"{0}\"")]
    UnknownCategory(String),
    #[error("Unknown billing period: \"{0}\"")]
    UnknownBillingPeriod(String),
    #[error("Unknown renewal window: \"{0}\"")]
    UnknownRenewalWindow(String),
    #[error("Invalid date: \"{0}\"")]
    InvalidDate(String),
}
