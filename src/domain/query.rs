//! Query and page types exchanged with the backend.

use super::row::Row;
use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub dir: SortDir,
}

impl SortSpec {
    #[must_use]
    pub fn asc(key: impl Into<String>) -> Self {
        Self { key: key.into(), dir: SortDir::Asc }
    }

    #[must_use]
    pub fn desc(key: impl Into<String>) -> Self {
        Self { key: key.into(), dir: SortDir::Desc }
    }

    /// Next sort after the user clicks `key`: same key flips, a new key
    /// starts ascending.
    #[must_use]
    pub fn toggled(current: Option<&Self>, key: &str) -> Self {
        match current {
            Some(spec) if spec.key == key => Self { key: key.to_string(), dir: spec.dir.flipped() },
            _ => Self::asc(key),
        }
    }
}

/// A complete listing request.
///
/// Replaced wholesale on every interaction; never mutated in place once it
/// has been handed to the sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub text: String,
    pub sort: Option<SortSpec>,
    pub limit: u32,
    pub offset: u32,
}

impl Query {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { text: String::new(), sort: None, limit: limit.max(1), offset: 0 }
    }

    /// True when `other` asks for the same result set, ignoring position.
    ///
    /// A change of text or sort invalidates the page position; a change of
    /// limit or offset alone does not.
    #[must_use]
    pub fn same_selection(&self, other: &Self) -> bool {
        self.text == other.text && self.sort == other.sort
    }

    /// Query-string parameters for `GET <collection>`.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.text.clone()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.key.clone()));
            params.push(("dir", sort.dir.as_str().to_string()));
        }
        params
    }
}

/// One page of a server-paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Row>,
    pub total: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Page {
    /// Repairs `count` so that it always equals `items.len()`.
    ///
    /// The backend's `count` is advisory; the items are what gets shown.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.count = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_same_key_flips_direction() {
        let current = SortSpec::asc("name");
        assert_eq!(SortSpec::toggled(Some(&current), "name"), SortSpec::desc("name"));
        assert_eq!(SortSpec::toggled(Some(&current), "end_date"), SortSpec::asc("end_date"));
        assert_eq!(SortSpec::toggled(None, "name"), SortSpec::asc("name"));
    }

    #[test]
    fn test_same_selection_ignores_position() {
        let a = Query { text: "etf".into(), sort: None, limit: 10, offset: 0 };
        let b = Query { offset: 20, limit: 50, ..a.clone() };
        let c = Query { text: "etfs".into(), ..a.clone() };
        assert!(a.same_selection(&b));
        assert!(!a.same_selection(&c));
    }

    #[test]
    fn test_params_include_sort_only_when_set() {
        let mut query = Query::new(10);
        query.text = "msci".into();
        assert_eq!(query.to_params().len(), 3);
        query.sort = Some(SortSpec::desc("name"));
        let params = query.to_params();
        assert!(params.contains(&("dir", "desc".to_string())));
    }

    #[test]
    fn test_page_count_follows_items() {
        let page: Page =
            serde_json::from_str(r#"{"items": [{"id": 1}], "total": 7, "count": 5, "offset": 0}"#)
                .unwrap();
        assert_eq!(page.normalized().count, 1);
    }
}
