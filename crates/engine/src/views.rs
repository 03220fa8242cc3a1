//! Per-page filter passes.
//!
//! Each view is the logical AND of its predicates, evaluated in one pass
//! over the collection. Predicates are pure, so the result equals chaining
//! the matching `filter_by_*` functions in any order.

use api_types::{group::Group, receipt::Receipt, subscription::Subscription};
use chrono::{DateTime, Utc};

use crate::{
    FilterCriteria,
    predicates::{SearchTerm, has_billing_period, has_category, within_range, within_window},
    records::{Dated, Searchable},
};

/// Groups: creation date range and name search.
pub fn filter_groups<'a, I>(groups: I, criteria: &FilterCriteria) -> Vec<&'a Group>
where
    I: IntoIterator<Item = &'a Group>,
{
    let term = SearchTerm::new(&criteria.search_term);
    groups
        .into_iter()
        .filter(|group| {
            within_range(group.timestamp(), criteria.start_date, criteria.end_date)
                && term.matches(group.search_texts())
        })
        .collect()
}

/// Receipts: purchase date range, merchant or item-name search, item category.
pub fn filter_receipts<'a, I>(receipts: I, criteria: &FilterCriteria) -> Vec<&'a Receipt>
where
    I: IntoIterator<Item = &'a Receipt>,
{
    let term = SearchTerm::new(&criteria.search_term);
    receipts
        .into_iter()
        .filter(|receipt| {
            within_range(receipt.timestamp(), criteria.start_date, criteria.end_date)
                && term.matches(receipt.search_texts())
                && has_category(receipt, &criteria.category)
        })
        .collect()
}

/// Subscriptions: merchant search, renewal window from `now`, billing period.
pub fn filter_subscriptions<'a, I>(
    subscriptions: I,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<&'a Subscription>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    let term = SearchTerm::new(&criteria.search_term);
    subscriptions
        .into_iter()
        .filter(|subscription| {
            term.matches(subscription.search_texts())
                && within_window(subscription.timestamp(), criteria.renewal_window, now)
                && has_billing_period(subscription, &criteria.billing_period)
        })
        .collect()
}

/// How many renewals the upcoming list shows by default.
pub const UPCOMING_RENEWALS_SHOWN: usize = 5;

/// The next `limit` renewals at or after `now`, soonest first.
///
/// Ties keep input order. Malformed renewal dates never qualify.
pub fn upcoming_renewals<'a, I>(
    subscriptions: I,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<&'a Subscription>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    let mut upcoming: Vec<(DateTime<Utc>, &'a Subscription)> = subscriptions
        .into_iter()
        .filter_map(|subscription| {
            subscription
                .timestamp()
                .filter(|renewal| *renewal >= now)
                .map(|renewal| (renewal, subscription))
        })
        .collect();
    upcoming.sort_by_key(|(renewal, _)| *renewal);
    upcoming
        .into_iter()
        .take(limit)
        .map(|(_, subscription)| subscription)
        .collect()
}
