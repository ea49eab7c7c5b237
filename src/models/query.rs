use chrono::NaiveDate;

use crate::error::{MixpanelError, Result};
use crate::params::{encode_json_array, QueryParams, QueryRequest};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw event export over an inclusive date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportQuery {
    /// First day to export, `yyyy-mm-dd` (UTC, inclusive)
    pub from_date: String,
    /// Last day to export, `yyyy-mm-dd` (UTC, inclusive)
    pub to_date: String,
    /// Restrict the export to these event names
    pub events: Vec<String>,
    /// Filter expression, passed through untouched
    pub where_clause: Option<String>,
}

impl ExportQuery {
    pub fn new(from_date: impl Into<String>, to_date: impl Into<String>) -> Self {
        Self {
            from_date: from_date.into(),
            to_date: to_date.into(),
            ..Default::default()
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    pub fn with_where(mut self, expression: impl Into<String>) -> Self {
        self.where_clause = Some(expression.into());
        self
    }

    /// Checks the date range before anything is signed or sent.
    pub fn validate(&self) -> Result<()> {
        if self.from_date.is_empty() || self.to_date.is_empty() {
            return Err(MixpanelError::Validation(
                "export queries require both from_date and to_date".to_string(),
            ));
        }

        let from = parse_date(&self.from_date)?;
        let to = parse_date(&self.to_date)?;
        if from > to {
            return Err(MixpanelError::Validation(format!(
                "from_date {} is after to_date {}",
                self.from_date, self.to_date
            )));
        }

        Ok(())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| MixpanelError::InvalidDate(value.to_string()))
}

impl QueryRequest for ExportQuery {
    fn append_params(&self, params: &mut QueryParams) -> Result<()> {
        self.validate()?;

        params.set("from_date", &self.from_date);
        params.set("to_date", &self.to_date);
        if !self.events.is_empty() {
            params.set("event", encode_json_array(&self.events)?);
        }
        if let Some(expression) = self.where_clause.as_deref().filter(|w| !w.is_empty()) {
            params.set("where", expression);
        }
        Ok(())
    }
}

/// People (profile) query against the engage API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngageQuery {
    pub where_clause: Option<String>,
    /// Session returned by a previous page, required when paging
    pub session_id: Option<String>,
    pub page: Option<u32>,
}

impl QueryRequest for EngageQuery {
    fn append_params(&self, params: &mut QueryParams) -> Result<()> {
        if self.page.is_some_and(|p| p > 0) && self.session_id.is_none() {
            return Err(MixpanelError::Validation(
                "paging past the first page requires a session_id".to_string(),
            ));
        }

        if let Some(expression) = self.where_clause.as_deref().filter(|w| !w.is_empty()) {
            params.set("where", expression);
        }
        if let Some(session_id) = &self.session_id {
            params.set("session_id", session_id);
        }
        if let Some(page) = self.page {
            params.set("page", page.to_string());
        }
        Ok(())
    }
}
