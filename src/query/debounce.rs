//! Debounced search input.
//!
//! Collapses bursts of keystrokes into a single trigger carrying the latest
//! text. The debouncer itself owns no timer: it hands out a generation number
//! every time it is re-armed and only honours a fire for the newest one. The
//! runtime maps generations onto real (abortable) timers; tests drive it with
//! explicit instants.

use std::time::{Duration, Instant};

/// Default quiet interval before a search is issued.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
struct Pending {
    text: String,
    generation: u64,
    deadline: Instant,
}

/// Collapses rapid input changes into one delayed trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<Pending>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay, generation: 0, pending: None }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Records `text` and re-arms the timer, replacing any pending trigger.
    ///
    /// Returns the generation the caller must pass back to [`Debouncer::fire`].
    /// No value-equality short-circuit: typing a value back to what it was
    /// still re-arms and still emits.
    pub fn on_change(&mut self, text: impl Into<String>, now: Instant) -> u64 {
        self.generation += 1;
        let text = text.into();
        tracing::trace!(generation = self.generation, query = %text, "debounce re-armed");
        self.pending = Some(Pending {
            text,
            generation: self.generation,
            deadline: now + self.delay,
        });
        self.generation
    }

    /// Consumes the pending text if `generation` is still the newest one.
    ///
    /// A timer belonging to a superseded generation yields `None`.
    pub fn fire(&mut self, generation: u64) -> Option<String> {
        match &self.pending {
            Some(pending) if pending.generation == generation => {
                self.pending.take().map(|p| p.text)
            }
            _ => {
                tracing::trace!(generation, current = self.generation, "stale debounce timer ignored");
                None
            }
        }
    }

    /// Clock-driven variant of [`Debouncer::fire`]: emits once the deadline
    /// of the pending trigger has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => self.pending.take().map(|p| p.text),
            _ => None,
        }
    }

    /// Drops the pending trigger without emitting.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub const fn current_generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_emits_once_with_latest_text() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.on_change("e", start);
        debouncer.on_change("et", start + Duration::from_millis(100));
        debouncer.on_change("etf", start + Duration::from_millis(200));

        assert_eq!(debouncer.poll(start + Duration::from_millis(450)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(500)).as_deref(),
            Some("etf")
        );
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_superseded_generation_never_fires() {
        let now = Instant::now();
        let mut debouncer = Debouncer::default();
        let first = debouncer.on_change("a", now);
        let second = debouncer.on_change("ab", now);

        assert_eq!(debouncer.fire(first), None);
        assert_eq!(debouncer.fire(second).as_deref(), Some("ab"));
        assert_eq!(debouncer.fire(second), None);
    }

    #[test]
    fn test_same_value_still_emits() {
        let now = Instant::now();
        let mut debouncer = Debouncer::default();
        let g = debouncer.on_change("etf", now);
        assert_eq!(debouncer.fire(g).as_deref(), Some("etf"));

        let g = debouncer.on_change("etf", now);
        assert_eq!(debouncer.fire(g).as_deref(), Some("etf"));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let now = Instant::now();
        let mut debouncer = Debouncer::default();
        let g = debouncer.on_change("x", now);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.fire(g), None);
    }
}
