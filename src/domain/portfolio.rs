//! Portfolio form drafts.
//!
//! Portfolios are the one entity whose creation form has a rule worth
//! enforcing client-side: the end date may not precede the start date. The
//! draft is checked before any request is built.

use super::error::{ApiFailure, ValidationKind};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

/// Fields of the "new portfolio" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioDraft {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub manager_name: Option<String>,
}

impl PortfolioDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date: None,
            description: None,
            manager_name: None,
        }
    }

    /// Validates the draft and returns the JSON body to post.
    ///
    /// # Errors
    ///
    /// Returns a `Validation(InvalidField)` failure when the name is blank or
    /// the end date is before the start date.
    pub fn to_body(&self) -> Result<Value, ApiFailure> {
        if self.name.trim().is_empty() {
            return Err(ApiFailure::validation(
                ValidationKind::InvalidField,
                "name must not be blank",
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ApiFailure::validation(
                    ValidationKind::InvalidField,
                    format!("end_date {end} is before start_date {}", self.start_date),
                ));
            }
        }

        let mut draft = self.clone();
        draft.name = draft.name.trim().to_string();
        serde_json::to_value(&draft)
            .map_err(|e| ApiFailure::request(format!("failed to encode portfolio: {e}")))
    }
}
