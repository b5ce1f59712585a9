//! Deterministic client-side sorting.
//!
//! Comparator policy per column kind:
//!
//! - **Date**: compared as instants. A missing or unparsable date sorts as the
//!   earliest possible instant, so an open-ended `end_date` comes *first* in
//!   ascending order.
//! - **Number**: compared numerically; non-numeric values count as `0`.
//! - **Text**: case-insensitive Unicode collation of the displayed text, so
//!   accented letters sort with their base letter (`"été"` before `"zone"`).
//!   Falls back to lowercase code-point order if collation data is missing.
//!
//! Sorting is stable in both directions: rows that compare equal keep their
//! original relative order.

use super::schema::{ColumnKind, TableSchema};
use crate::domain::{Row, SortDir, SortSpec};
use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed};
use std::cmp::Ordering;

/// Row comparator for one sort pass.
pub struct RowOrder {
    collator: Option<CollatorBorrowed<'static>>,
}

impl RowOrder {
    /// Loads the root collation at secondary strength: case is ignored,
    /// accents only break ties between otherwise equal strings.
    #[must_use]
    pub fn new() -> Self {
        let mut options = CollatorOptions::default();
        options.strength = Some(Strength::Secondary);
        let collator = Collator::try_new(Default::default(), options)
            .map_err(|e| tracing::warn!(error = %e, "collation data unavailable, sorting by code point"))
            .ok();
        Self { collator }
    }

    /// Compares two rows on `key` under the policy for `kind`, ascending.
    #[must_use]
    pub fn compare(&self, a: &Row, b: &Row, key: &str, kind: ColumnKind) -> Ordering {
        let (left, right) = (a.get(key), b.get(key));
        match kind {
            // `None < Some(_)`: a missing date is the earliest instant.
            ColumnKind::Date => left.as_instant().cmp(&right.as_instant()),
            ColumnKind::Number => left.as_number().total_cmp(&right.as_number()),
            ColumnKind::Text => self.compare_text(&left.display(), &right.display()),
        }
    }

    fn compare_text(&self, left: &str, right: &str) -> Ordering {
        if let Some(collator) = &self.collator {
            return collator.compare(left, right);
        }
        let l = left.chars().flat_map(char::to_lowercase);
        let r = right.chars().flat_map(char::to_lowercase);
        l.cmp(r)
    }
}

impl Default for RowOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RowOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowOrder")
            .field("collated", &self.collator.is_some())
            .finish()
    }
}

/// Sorts `rows` in place according to `spec`.
///
/// `sort_by` is stable, so rows that compare equal keep their order.
pub fn sort_rows(rows: &mut [Row], spec: &SortSpec, schema: &TableSchema) {
    let kind = schema.kind_of(&spec.key);
    let order = RowOrder::new();
    rows.sort_by(|a, b| {
        let ordering = order.compare(a, b, &spec.key, kind);
        match spec.dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::schema::ColumnSpec;
    use proptest::prelude::*;

    fn schema() -> TableSchema {
        TableSchema::new(
            "id",
            vec![
                ColumnSpec::text("name"),
                ColumnSpec::date("end_date"),
                ColumnSpec::number("aum"),
            ],
        )
    }

    fn ids(rows: &[Row]) -> Vec<String> {
        rows.iter().filter_map(|r| r.key("id")).collect()
    }

    fn portfolios() -> Vec<Row> {
        vec![
            Row::new().with("id", 1).with("name", "Zeta").with("end_date", None::<&str>),
            Row::new().with("id", 2).with("name", "Alpha").with("end_date", "2020-01-01"),
        ]
    }

    #[test]
    fn test_sort_by_name_ascending() {
        let mut rows = portfolios();
        sort_rows(&mut rows, &SortSpec::asc("name"), &schema());
        assert_eq!(ids(&rows), vec!["2", "1"]);
    }

    #[test]
    fn test_missing_end_date_sorts_first_ascending() {
        let mut rows = portfolios();
        rows.reverse();
        sort_rows(&mut rows, &SortSpec::asc("end_date"), &schema());
        assert_eq!(ids(&rows), vec!["1", "2"]);

        sort_rows(&mut rows, &SortSpec::desc("end_date"), &schema());
        assert_eq!(ids(&rows), vec!["2", "1"]);
    }

    #[test]
    fn test_numeric_sort_coerces_garbage_to_zero() {
        let mut rows = vec![
            Row::new().with("id", 1).with("aum", 10.5),
            Row::new().with("id", 2).with("aum", "n/a"),
            Row::new().with("id", 3).with("aum", -2),
            Row::new().with("id", 4).with("aum", "100"),
        ];
        sort_rows(&mut rows, &SortSpec::asc("aum"), &schema());
        assert_eq!(ids(&rows), vec!["3", "2", "1", "4"]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive_and_stable() {
        let mut rows = vec![
            Row::new().with("id", 1).with("name", "beta"),
            Row::new().with("id", 2).with("name", "Alpha"),
            Row::new().with("id", 3).with("name", "BETA"),
            Row::new().with("id", 4).with("name", "alpha"),
        ];
        sort_rows(&mut rows, &SortSpec::asc("name"), &schema());
        assert_eq!(ids(&rows), vec!["2", "4", "1", "3"]);

        sort_rows(&mut rows, &SortSpec::desc("name"), &schema());
        assert_eq!(ids(&rows), vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn test_accented_names_sort_with_their_base_letter() {
        let mut rows = vec![
            Row::new().with("id", 1).with("name", "Zeta"),
            Row::new().with("id", 2).with("name", "Émile"),
            Row::new().with("id", 3).with("name", "zone"),
            Row::new().with("id", 4).with("name", "été"),
            Row::new().with("id", 5).with("name", "Alpha"),
        ];
        sort_rows(&mut rows, &SortSpec::asc("name"), &schema());
        assert_eq!(ids(&rows), vec!["5", "2", "4", "1", "3"]);
    }

    #[test]
    fn test_accent_breaks_ties_only() {
        let order = RowOrder::new();
        let plain = Row::new().with("name", "resume");
        let accented = Row::new().with("name", "Résumé");
        let next = Row::new().with("name", "resumes");
        assert_eq!(order.compare(&plain, &accented, "name", ColumnKind::Text), Ordering::Less);
        assert_eq!(order.compare(&accented, &next, "name", ColumnKind::Text), Ordering::Less);
    }

    fn named_rows(names: &[String]) -> Vec<Row> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Row::new().with("id", i64::try_from(i).unwrap()).with("name", name.as_str())
            })
            .collect()
    }

    proptest! {
        #[test]
        fn sorting_is_idempotent(names in proptest::collection::vec("[a-zA-Z]{0,6}", 0..30), desc in any::<bool>()) {
            let spec = if desc { SortSpec::desc("name") } else { SortSpec::asc("name") };
            let mut once = named_rows(&names);
            sort_rows(&mut once, &spec, &schema());
            let mut twice = once.clone();
            sort_rows(&mut twice, &spec, &schema());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn descending_reverses_ascending_for_distinct_keys(
            names in proptest::collection::btree_set("[a-z]{1,8}", 0..30)
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let mut asc = named_rows(&names);
            sort_rows(&mut asc, &SortSpec::asc("name"), &schema());
            let mut desc = asc.clone();
            sort_rows(&mut desc, &SortSpec::desc("name"), &schema());
            desc.reverse();
            prop_assert_eq!(asc, desc);
        }
    }
}
