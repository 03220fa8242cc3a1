//! Single-dimension predicates.
//!
//! Each `filter_by_*` function takes any iterator of borrowed records and
//! returns the kept references in input order, so calls chain in any order
//! without cloning or mutating the collection. The `pub(crate)` checks
//! below are what the composed views in [`crate::views`] evaluate in a
//! single pass.

use api_types::{
    receipt::{Category, Receipt},
    subscription::{BillingPeriod, Subscription},
};
use chrono::{DateTime, Utc};

use crate::{Filter, RenewalWindow, dates, records::Dated};

/// Lower-cased search term; empty matches everything.
#[derive(Clone, Debug)]
pub(crate) struct SearchTerm(String);

impl SearchTerm {
    pub(crate) fn new(term: &str) -> Self {
        Self(term.to_lowercase())
    }

    pub(crate) fn matches<'t>(&self, texts: impl IntoIterator<Item = &'t str>) -> bool {
        if self.0.is_empty() {
            return true;
        }
        texts
            .into_iter()
            .any(|text| text.to_lowercase().contains(&self.0))
    }
}

pub(crate) fn within_range(
    date: Option<DateTime<Utc>>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(date) = date else {
        tracing::debug!("excluding record with malformed date from range filter");
        return false;
    };
    if let Some(start) = start
        && date < start
    {
        return false;
    }
    if let Some(end) = end
        && date > end
    {
        return false;
    }
    true
}

pub(crate) fn has_category(receipt: &Receipt, category: &Filter<Category>) -> bool {
    category.matches(|wanted| {
        receipt
            .items
            .iter()
            .any(|item| item.category.as_deref() == Some(wanted.as_str()))
    })
}

pub(crate) fn has_billing_period(subscription: &Subscription, period: &Filter<BillingPeriod>) -> bool {
    period.matches(|wanted| subscription.billing_period == wanted.as_str())
}

pub(crate) fn within_window(
    renewal: Option<DateTime<Utc>>,
    window: RenewalWindow,
    now: DateTime<Utc>,
) -> bool {
    let Some(months) = window.months() else {
        return true;
    };
    let Some(renewal) = renewal else {
        tracing::debug!("excluding subscription with malformed renewal date");
        return false;
    };
    if renewal < now {
        return false;
    }
    match dates::add_months(now, months) {
        Some(limit) => renewal <= limit,
        None => true,
    }
}

/// Keep records dated within `[start, end]`; absent bounds are open.
///
/// Dates compare at full precision: with `end` at midnight, a record at
/// 23:59 on that same day is excluded. Records whose date cannot be
/// extracted are excluded whenever a bound is present.
pub fn filter_by_date_range<'a, T, I, F>(
    records: I,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    date_of: F,
) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<DateTime<Utc>>,
{
    records
        .into_iter()
        .filter(|record| within_range(date_of(*record), start, end))
        .collect()
}

/// Keep records where any text from `text_of` contains `term`, ignoring case.
pub fn filter_by_text<'a, T, I, F>(records: I, term: &str, text_of: F) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Vec<&str>,
{
    let term = SearchTerm::new(term);
    records
        .into_iter()
        .filter(|record| term.matches(text_of(*record)))
        .collect()
}

/// Keep receipts with at least one line item of exactly `category`.
pub fn filter_by_category<'a, I>(receipts: I, category: &Filter<Category>) -> Vec<&'a Receipt>
where
    I: IntoIterator<Item = &'a Receipt>,
{
    receipts
        .into_iter()
        .filter(|receipt| has_category(receipt, category))
        .collect()
}

pub fn filter_by_billing_period<'a, I>(
    subscriptions: I,
    period: &Filter<BillingPeriod>,
) -> Vec<&'a Subscription>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    subscriptions
        .into_iter()
        .filter(|subscription| has_billing_period(subscription, period))
        .collect()
}

/// Keep subscriptions renewing within `[now, now + months]`, both ends inclusive.
///
/// The upper bound uses calendar month addition (see [`dates::add_months`]).
/// [`RenewalWindow::Any`] keeps every subscription, malformed dates included.
pub fn filter_by_renewal_window<'a, I>(
    subscriptions: I,
    window: RenewalWindow,
    now: DateTime<Utc>,
) -> Vec<&'a Subscription>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    subscriptions
        .into_iter()
        .filter(|subscription| within_window(subscription.timestamp(), window, now))
        .collect()
}
