//! Server-side query controllers.
//!
//! These three pieces reconcile user input against a slow, out-of-order
//! backend:
//!
//! ```text
//! keystrokes → Debouncer → RequestSequencer → (transport) → Pagination + view
//! ```
//!
//! - [`debounce`]: collapses bursts of input into one trigger
//! - [`sequencer`]: tags requests and discards stale responses
//! - [`pagination`]: limit/offset/total with boundary-safe moves

pub mod debounce;
pub mod pagination;
pub mod sequencer;

pub use debounce::Debouncer;
pub use pagination::Pagination;
pub use sequencer::{RequestSequencer, RequestTicket, Resolution};
