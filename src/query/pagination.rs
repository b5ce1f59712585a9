//! Limit/offset pagination state.
//!
//! `total` is only ever taken from the most recently applied response, never
//! extrapolated. Moving past either boundary is a no-op, not an error.

use crate::domain::Page;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u32,
    offset: u32,
    total: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl Pagination {
    /// Creates pagination at offset 0. A zero limit is bumped to 1.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self { limit: if limit == 0 { 1 } else { limit }, offset: 0, total: 0 }
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.offset.saturating_add(self.limit) < self.total
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.offset > 0
    }

    /// Advances by one page. Returns whether the offset changed.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.offset += self.limit;
        true
    }

    /// Moves back one page, clamped at 0. Returns whether the offset changed.
    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.limit);
        true
    }

    /// Changes the page size and rewinds to the first page.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
        self.offset = 0;
    }

    /// Rewinds to the first page.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Sets the offset an authorized request will use.
    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    /// Returns to a previously applied position, keeping the total.
    pub fn restore(&mut self, limit: u32, offset: u32) {
        self.limit = limit.max(1);
        self.offset = offset;
    }

    /// Adopts the position and total of an applied (non-stale) page.
    pub fn apply(&mut self, page: &Page) {
        self.total = page.total;
        self.offset = page.offset;
    }

    /// Adopts a total derived locally from a resident dataset.
    ///
    /// The offset is pulled back onto the last page when the view shrank
    /// underneath it.
    pub fn set_total(&mut self, total: u32) {
        self.total = total;
        if total == 0 {
            self.offset = 0;
        } else if self.offset >= total {
            self.offset = (total - 1) / self.limit * self.limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(limit: u32, offset: u32, total: u32) -> Pagination {
        let mut p = Pagination::new(limit);
        p.apply(&Page { items: vec![], total, count: 0, offset });
        p
    }

    #[test]
    fn test_next_is_noop_on_last_page() {
        let mut p = at(10, 20, 25);
        assert!(!p.next());
        assert_eq!(p.offset(), 20);
        assert!(p.prev());
        assert_eq!(p.offset(), 10);
    }

    #[test]
    fn test_prev_is_noop_on_first_page() {
        let mut p = at(10, 0, 25);
        assert!(!p.prev());
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_prev_clamps_at_zero() {
        let mut p = at(10, 5, 25);
        assert!(p.prev());
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_set_limit_rewinds() {
        let mut p = at(10, 20, 100);
        p.set_limit(50);
        assert_eq!((p.limit(), p.offset()), (50, 0));
        p.set_limit(0);
        assert_eq!(p.limit(), 1);
    }

    #[test]
    fn test_set_total_pulls_offset_back() {
        let mut p = at(10, 40, 100);
        p.set_total(25);
        assert_eq!(p.offset(), 20);
        p.set_total(0);
        assert_eq!(p.offset(), 0);
    }

    proptest! {
        #[test]
        fn next_then_prev_round_trips(limit in 1u32..500, pages in 0u32..50, extra in 0u32..1000) {
            let total = limit * 2 + extra;
            let max_offset = total.saturating_sub(limit + 1);
            let offset = (pages * limit).min(max_offset / limit * limit);
            let mut p = at(limit, offset, total);
            prop_assume!(p.has_next());
            let before = p.offset();
            prop_assert!(p.next());
            prop_assert!(p.prev());
            prop_assert_eq!(p.offset(), before);
        }

        #[test]
        fn boundaries_are_noops(limit in 1u32..100, total in 0u32..1000) {
            let mut first = at(limit, 0, total);
            prop_assert!(!first.prev());
            prop_assert_eq!(first.offset(), 0);

            let last_offset = if total == 0 { 0 } else { (total - 1) / limit * limit };
            let mut last = at(limit, last_offset, total);
            prop_assert!(!last.next());
            prop_assert_eq!(last.offset(), last_offset);
        }
    }
}
