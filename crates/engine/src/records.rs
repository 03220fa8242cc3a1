//! Default extractors for the record types the views filter.

use api_types::{group::Group, receipt::Receipt, subscription::Subscription};
use chrono::{DateTime, Utc};

use crate::dates;

/// A record with one date relevant to filtering.
pub trait Dated {
    /// Parsed date, or `None` when the raw value is malformed.
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

/// A record matched by free-text search.
pub trait Searchable {
    /// Every text source a search term may match; any one match is enough.
    fn search_texts(&self) -> Vec<&str>;
}

impl Dated for Group {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        dates::parse_timestamp(&self.created_at)
    }
}

impl Searchable for Group {
    fn search_texts(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl Dated for Receipt {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        dates::parse_timestamp(&self.date)
    }
}

impl Searchable for Receipt {
    fn search_texts(&self) -> Vec<&str> {
        self.merchant
            .as_deref()
            .into_iter()
            .chain(self.items.iter().map(|item| item.name.as_str()))
            .collect()
    }
}

impl Dated for Subscription {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        dates::parse_timestamp(&self.renewal_date)
    }
}

impl Searchable for Subscription {
    fn search_texts(&self) -> Vec<&str> {
        vec![self.merchant.as_str()]
    }
}
