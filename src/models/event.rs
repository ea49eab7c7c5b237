use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Properties;
use crate::error::{MixpanelError, Result};
use crate::params::QueryParams;

/// Identifier correlating events and profile updates to one end user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistinctId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for DistinctId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistinctId::Numeric(id) => write!(f, "{id}"),
            DistinctId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for DistinctId {
    fn from(id: i64) -> Self {
        DistinctId::Numeric(id)
    }
}

impl From<String> for DistinctId {
    fn from(id: String) -> Self {
        DistinctId::Text(id)
    }
}

impl From<&str> for DistinctId {
    fn from(id: &str) -> Self {
        DistinctId::Text(id.to_string())
    }
}

/// A single tracking event, consumed once per send.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEvent {
    pub distinct_id: DistinctId,
    pub name: String,
    /// Event time; defaults to the moment the payload is encoded
    pub timestamp: Option<DateTime<Utc>>,
    pub properties: Properties,
}

impl TrackEvent {
    pub fn new(distinct_id: impl Into<DistinctId>, name: impl Into<String>) -> Self {
        Self {
            distinct_id: distinct_id.into(),
            name: name.into(),
            timestamp: None,
            properties: Properties::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.set(key, value);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MixpanelError::Validation(
                "event name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Query-string modifiers understood by the `/track` endpoint.
///
/// Defaults leave every modifier off, so nothing is appended to the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackOptions {
    /// Use the request's origin IP for geolocation (`ip=1`)
    pub ip: bool,
    /// Redirect the caller to this URL after tracking
    pub redirect: Option<String>,
    /// Respond with a 1x1 transparent pixel (`img=1`)
    pub img: bool,
    /// Wrap the response in a call to this JS function
    pub callback: Option<String>,
    /// Respond with a status object instead of `1`/`0` (`verbose=1`)
    pub verbose: bool,
}

impl TrackOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn append_to(&self, params: &mut QueryParams) {
        if self.ip {
            params.set("ip", "1");
        }
        if let Some(redirect) = self.redirect.as_deref().filter(|r| !r.is_empty()) {
            params.set("redirect", redirect);
        }
        if self.img {
            params.set("img", "1");
        }
        if let Some(callback) = self.callback.as_deref().filter(|c| !c.is_empty()) {
            params.set("callback", callback);
        }
        if self.verbose {
            params.set("verbose", "1");
        }
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        self.append_to(&mut params);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_id_display() {
        assert_eq!(DistinctId::from(13793_i64).to_string(), "13793");
        assert_eq!(DistinctId::from("user-1").to_string(), "user-1");
    }

    #[test]
    fn test_empty_event_name_is_rejected() {
        let event = TrackEvent::new("u1", "  ");
        assert!(matches!(
            event.validate(),
            Err(MixpanelError::Validation(_))
        ));
    }

    #[test]
    fn test_default_options_add_nothing() {
        let options = TrackOptions::default();
        assert!(options.is_empty());
        assert!(options.to_params().is_empty());
    }

    #[test]
    fn test_empty_strings_are_omitted() {
        let options = TrackOptions {
            redirect: Some(String::new()),
            callback: Some(String::new()),
            verbose: true,
            ..Default::default()
        };

        let params = options.to_params();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("verbose"), Some("1"));
    }

    #[test]
    fn test_all_modifiers() {
        let options = TrackOptions {
            ip: true,
            redirect: Some("https://example.com/thanks".to_string()),
            img: true,
            callback: Some("mpCallback".to_string()),
            verbose: true,
        };

        let params = options.to_params();
        assert_eq!(params.get("ip"), Some("1"));
        assert_eq!(params.get("img"), Some("1"));
        assert_eq!(params.get("redirect"), Some("https://example.com/thanks"));
        assert_eq!(params.get("callback"), Some("mpCallback"));
    }
}
