//! Request sequencing for out-of-order responses.
//!
//! Every logical request gets a monotonically increasing sequence number.
//! Any number of requests may be in flight; only the response carrying the
//! newest sequence is ever applied. Transport-level cancellation is not
//! needed: superseded responses are simply dropped on arrival.

use crate::domain::{ApiFailure, Query};

/// A request the sequencer has authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub sequence: u64,
    pub query: Query,
}

/// Outcome of feeding a response back into the sequencer.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Response to the authoritative request; apply it.
    Applied(T),
    /// Failure of the authoritative request; surface it.
    Failed(ApiFailure),
    /// Response to a superseded request; never reaches the view.
    Stale,
}

/// Single source of truth for which query is authoritative.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    last_sequence: u64,
    last_query: Option<Query>,
    applied: Option<Query>,
    awaiting: bool,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorizes a new request and makes it the authoritative one.
    ///
    /// If the text or sort differs from the previously submitted query the
    /// offset is reset to 0; a pure page move keeps the requested offset.
    pub fn submit(&mut self, mut query: Query) -> RequestTicket {
        if let Some(previous) = &self.last_query {
            if !previous.same_selection(&query) && query.offset != 0 {
                tracing::debug!(
                    previous_offset = query.offset,
                    "query selection changed, resetting offset"
                );
                query.offset = 0;
            }
        }

        self.last_sequence += 1;
        self.last_query = Some(query.clone());
        self.awaiting = true;

        tracing::debug!(
            sequence = self.last_sequence,
            query = %query.text,
            offset = query.offset,
            limit = query.limit,
            "request submitted"
        );

        RequestTicket { sequence: self.last_sequence, query }
    }

    /// Gates a response by sequence number.
    ///
    /// A failure of the authoritative request rolls the reference query back
    /// to the last applied one, so the next page move is compared against
    /// what the view actually shows.
    pub fn resolve<T>(
        &mut self,
        sequence: u64,
        result: Result<T, ApiFailure>,
    ) -> Resolution<T> {
        if sequence != self.last_sequence {
            tracing::debug!(
                sequence,
                latest = self.last_sequence,
                failed = result.is_err(),
                "stale response discarded"
            );
            return Resolution::Stale;
        }

        self.awaiting = false;
        match result {
            Ok(value) => {
                self.applied.clone_from(&self.last_query);
                Resolution::Applied(value)
            }
            Err(failure) => {
                self.last_query.clone_from(&self.applied);
                Resolution::Failed(failure)
            }
        }
    }

    /// True while the authoritative request has not resolved.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.awaiting
    }

    #[must_use]
    pub const fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

}
