//! Client-side narrowing of record collections.
//!
//! A page loads a whole collection (groups, receipts or subscriptions) and
//! then asks this crate for the subset matching the user's
//! [`FilterCriteria`]. Every function here is pure and synchronous: the
//! input is only borrowed, the output is a `Vec` of references into it, and
//! malformed record data leads to exclusion rather than an error.
//!
//! ```rust
//! use api_types::group::Group;
//! use engine::{FilterCriteria, filter_groups};
//!
//! let groups = vec![Group {
//!     id: 1,
//!     creator: 1,
//!     name: "Savings Squad".to_string(),
//!     created_at: "2024-03-25T10:00:00Z".to_string(),
//! }];
//! let criteria = FilterCriteria::new().with_search_term("savings");
//! assert_eq!(filter_groups(&groups, &criteria).len(), 1);
//! ```

pub use criteria::{FilterCriteria, parse_billing_period, parse_category, parse_date_bound};
pub use error::EngineError;
pub use filter::{Filter, RenewalWindow};
pub use predicates::{
    filter_by_billing_period, filter_by_category, filter_by_date_range,
    filter_by_renewal_window, filter_by_text,
};
pub use records::{Dated, Searchable};
pub use views::{
    UPCOMING_RENEWALS_SHOWN, filter_groups, filter_receipts, filter_subscriptions,
    upcoming_renewals,
};

mod criteria;
pub mod dates;
mod error;
mod filter;
mod predicates;
mod records;
mod views;
