//! JSON payloads for the ingestion endpoints.
//!
//! Tracking and engage requests carry their body as base64-encoded JSON under
//! a single `data` parameter.

use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::{DistinctId, ProfileOperation, ProfileUpdate, TrackEvent};
use crate::params::QueryParams;

pub const DATA_PARAM: &str = "data";

#[derive(Debug, Serialize)]
struct EventData<'a> {
    event: &'a str,
    properties: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct EngageData<'a> {
    #[serde(rename = "$token")]
    token: &'a str,
    #[serde(rename = "$distinct_id")]
    distinct_id: &'a DistinctId,
    #[serde(rename = "$time")]
    time: i64,
    #[serde(rename = "$ip", skip_serializing_if = "Option::is_none")]
    ip: Option<&'a str>,
    #[serde(rename = "$ignore_time", skip_serializing_if = "std::ops::Not::not")]
    ignore_time: bool,
    #[serde(flatten)]
    operation: &'a ProfileOperation,
}

/// Builds the payloads for one project token.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    token: String,
}

impl PayloadBuilder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Merge the required fields with the caller's properties.
    ///
    /// `time`, `token` and `distinct_id` are written first; anything the
    /// caller supplied under the same key replaces them.
    pub fn track_properties(&self, event: &TrackEvent, now: DateTime<Utc>) -> Map<String, Value> {
        let mut properties = Map::new();
        let time = event.timestamp.unwrap_or(now).timestamp();
        properties.insert("time".to_string(), Value::from(time));
        properties.insert("token".to_string(), Value::from(self.token.as_str()));
        properties.insert(
            "distinct_id".to_string(),
            Value::String(event.distinct_id.to_string()),
        );

        for (key, value) in event.properties.iter() {
            properties.insert(key.clone(), value.clone());
        }
        properties
    }

    fn event_data<'a>(&self, event: &'a TrackEvent) -> Result<EventData<'a>> {
        event.validate()?;
        Ok(EventData {
            event: &event.name,
            properties: self.track_properties(event, Utc::now()),
        })
    }

    pub fn build_track_payload(&self, event: &TrackEvent) -> Result<Vec<u8>> {
        let data = self.event_data(event)?;
        Ok(serde_json::to_vec(&data)?)
    }

    /// Encode events as one JSON array.
    ///
    /// Each event without a timestamp gets its own "now", taken as it is
    /// encoded.
    pub fn build_batch_payload(&self, events: &[TrackEvent]) -> Result<Vec<u8>> {
        let data = events
            .iter()
            .map(|event| self.event_data(event))
            .collect::<Result<Vec<_>>>()?;
        Ok(serde_json::to_vec(&data)?)
    }

    pub fn build_profile_payload(&self, update: &ProfileUpdate) -> Result<Vec<u8>> {
        let data = EngageData {
            token: &self.token,
            distinct_id: &update.distinct_id,
            time: update.time.unwrap_or_else(Utc::now).timestamp(),
            ip: update.ip.as_deref(),
            ignore_time: update.ignore_time,
            operation: &update.operation,
        };
        Ok(serde_json::to_vec(&data)?)
    }
}

pub fn encode_data(json: &[u8]) -> String {
    BASE64_STANDARD.encode(json)
}

/// Wrap an encoded payload as the single `data` parameter.
pub fn data_params(json: &[u8]) -> QueryParams {
    let mut params = QueryParams::new();
    params.set(DATA_PARAM, encode_data(json));
    params
}
