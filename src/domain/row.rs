//! Rows as returned by the backend.
//!
//! A [`Row`] is an opaque mapping from column name to a displayable scalar.
//! Nothing here knows what a portfolio or an asset is; the controllers only
//! read the columns configured as key, search or sort columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static NULL_CELL: CellValue = CellValue::Null;

/// A single cell value.
///
/// Deserialization is untagged: JSON `null`, booleans, numbers and strings
/// map to the matching variant; anything nested is kept as raw JSON so that a
/// surprising payload never fails a whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl CellValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text shown for the cell. `Null` renders as the empty string.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    #[allow(clippy::cast_possible_truncation)]
                    let whole = *n as i64;
                    whole.to_string()
                } else {
                    n.to_string()
                }
            }
            Self::Text(s) => s.clone(),
            Self::Other(v) => v.to_string(),
        }
    }

    /// Numeric value used by numeric sort keys.
    ///
    /// Numeric strings are parsed; everything that is not a number
    /// (including `Null`) coerces to `0.0`.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0),
            Self::Bool(b) => f64::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    /// Instant used by date sort keys.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339 strings.
    /// Returns `None` for `Null`, blank or unparsable values.
    #[must_use]
    pub fn as_instant(&self) -> Option<NaiveDateTime> {
        let Self::Text(raw) = self else {
            return None;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for CellValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl<T: Into<Self>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One record of a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly useful for fixtures.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    /// Returns the cell for `column`, or `Null` when the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> &CellValue {
        self.0.get(column).unwrap_or(&NULL_CELL)
    }

    /// Row identity under the given key column, `None` if the key is null.
    #[must_use]
    pub fn key(&self, key_column: &str) -> Option<String> {
        let cell = self.get(key_column);
        if cell.is_null() {
            None
        } else {
            Some(cell.display())
        }
    }
}
