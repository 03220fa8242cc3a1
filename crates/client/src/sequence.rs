//! Request fencing for fetch-then-display cycles.
//!
//! Each logical query takes a [`Ticket`] before it starts. When the
//! response arrives it is only applied if no newer ticket has been taken
//! since, so a slow, superseded request can never overwrite the result of
//! a later one.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// `Some(value)` if `ticket` is still the latest, `None` if it went stale.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "discarding stale response");
            None
        }
    }
}

/// A page's full collection as last loaded from the API.
#[derive(Debug)]
pub struct CollectionView<T> {
    records: Vec<T>,
    sequence: RequestSequence,
}

impl<T> Default for CollectionView<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            sequence: RequestSequence::new(),
        }
    }
}

impl<T> CollectionView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load; pass the ticket back to [`CollectionView::complete`].
    pub fn begin(&self) -> Ticket {
        self.sequence.next()
    }

    /// Replace the collection if `ticket` is still current. Returns whether it did.
    pub fn complete(&mut self, ticket: Ticket, records: Vec<T>) -> bool {
        match self.sequence.accept(ticket, records) {
            Some(records) => {
                self.records = records;
                true
            }
            None => false,
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }
}
