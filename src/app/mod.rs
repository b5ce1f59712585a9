//! Screen controller: state, events and actions.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow:
//!
//! ```text
//! View trigger → Event → handle_event → ScreenState → Actions → Transport / timers
//!                            ↑                                        ↓
//!                            └──────────── completion events ─────────┘
//! ```
//!
//! Each event runs to completion before the next one is looked at, so the
//! state has exactly one mutator. Ordering of network responses is decided
//! by the request sequencer, never by arrival order.
//!
//! # Modules
//!
//! - [`actions`]: side effects emitted by the handler
//! - [`handler`]: event processing and state transitions
//! - [`modes`]: server/local data modes and screen presets
//! - [`state`]: per-screen state and view model computation
//!
//! # Example
//!
//! ```rust
//! use refdesk::app::{handle_event, Action, Event, ScreenConfig, ScreenState};
//! use refdesk::Config;
//!
//! let mut state = ScreenState::new(ScreenConfig::assets(), &Config::default());
//! let (changed, actions) = handle_event(&mut state, &Event::SearchInput("msci".into()))?;
//! assert!(changed);
//! assert!(matches!(actions[0], Action::ArmDebounce { .. }));
//! # Ok::<(), refdesk::RefdeskError>(())
//! ```

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{DataMode, DataModeLabel, ScreenConfig};
pub use state::ScreenState;
