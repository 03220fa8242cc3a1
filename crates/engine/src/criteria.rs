use api_types::{receipt::Category, subscription::BillingPeriod};
use chrono::{DateTime, Utc};

use crate::{EngineError, Filter, RenewalWindow, dates};

/// User-chosen filter parameters for one view.
///
/// Built fresh on every change; the views only ever borrow it.
/// Each view reads the fields that apply to it:
///
/// | view          | dates | text | category | billing | renewal |
/// |---------------|-------|------|----------|---------|---------|
/// | groups        | yes   | yes  |          |         |         |
/// | receipts      | yes   | yes  | yes      |         |         |
/// | subscriptions |       | yes  |          | yes     | yes     |
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub search_term: String,
    pub category: Filter<Category>,
    pub billing_period: Filter<BillingPeriod>,
    pub renewal_window: RenewalWindow,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    #[must_use]
    pub fn with_end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    #[must_use]
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Filter<Category>) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_billing_period(mut self, period: Filter<BillingPeriod>) -> Self {
        self.billing_period = period;
        self
    }

    #[must_use]
    pub fn with_renewal_window(mut self, window: RenewalWindow) -> Self {
        self.renewal_window = window;
        self
    }

    /// `true` when no field constrains anything.
    pub fn is_unconstrained(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.search_term.is_empty()
            && self.category.is_all()
            && self.billing_period.is_all()
            && self.renewal_window == RenewalWindow::Any
    }
}

/// Parse a date bound typed by a user (`2024-03-21` or a full timestamp).
pub fn parse_date_bound(raw: &str) -> Result<DateTime<Utc>, EngineError> {
    dates::parse_timestamp(raw).ok_or_else(|| EngineError::InvalidDate(raw.to_string()))
}

pub fn parse_category(raw: &str) -> Result<Filter<Category>, EngineError> {
    raw.parse()
        .map_err(|_| EngineError::UnknownCategory(raw.to_string()))
}

pub fn parse_billing_period(raw: &str) -> Result<Filter<BillingPeriod>, EngineError> {
    raw.parse()
        .map_err(|_| EngineError::UnknownBillingPeriod(raw.to_string()))
}
