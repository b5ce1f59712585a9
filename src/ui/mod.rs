//! Result presenter.
//!
//! The view layer never reads `ScreenState` directly. It renders a
//! [`ViewModel`], recomputed after every state change:
//!
//! ```text
//! ScreenState → compute_viewmodel → ViewModel → watch channel → view
//! ```
//!
//! Everything here is `Serialize`, so a non-Rust front end can consume the
//! projection as JSON.

pub mod viewmodel;

pub use viewmodel::{ErrorView, ListStatus, ViewModel};
