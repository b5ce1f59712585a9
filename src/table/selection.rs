//! Row selection that survives re-sorting and re-filtering.
//!
//! Selection is tracked by row key, not by index, so reordering the view
//! never moves it to a different row. When the selected key drops out of the
//! view the selection is cleared silently.

use crate::domain::Row;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected_id: Option<String>,
}

impl Selection {
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected_id = id;
    }

    pub fn clear(&mut self) {
        self.selected_id = None;
    }

    /// Looks the selected row up in `view`.
    #[must_use]
    pub fn resolve<'a>(&self, view: &'a [Row], key_column: &str) -> Option<&'a Row> {
        let id = self.selected_id.as_deref()?;
        view.iter().find(|row| row.key(key_column).as_deref() == Some(id))
    }

    /// Clears the selection if its row is no longer in `view`.
    ///
    /// Returns true when the selection was dropped.
    pub fn retain_in(&mut self, view: &[Row], key_column: &str) -> bool {
        if self.selected_id.is_some() && self.resolve(view, key_column).is_none() {
            tracing::debug!(selected_id = ?self.selected_id, "selected row left the view, clearing");
            self.selected_id = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(ids: &[i32]) -> Vec<Row> {
        ids.iter().map(|id| Row::new().with("id", *id)).collect()
    }

    #[test]
    fn test_selection_follows_row_after_reorder() {
        let mut selection = Selection::default();
        selection.select(Some("2".to_string()));

        let reordered = view(&[3, 2, 1]);
        assert!(!selection.retain_in(&reordered, "id"));
        let row = selection.resolve(&reordered, "id").unwrap();
        assert_eq!(row.key("id").as_deref(), Some("2"));
    }

    #[test]
    fn test_selection_cleared_when_row_disappears() {
        let mut selection = Selection::default();
        selection.select(Some("2".to_string()));
        assert!(selection.retain_in(&view(&[1, 3]), "id"));
        assert_eq!(selection.selected_id(), None);
    }
}
