//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::prelude::*;
use mixpanel::transport::TransportResult;
use mixpanel::{Transport, TransportError};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Get {
        url: String,
    },
    Post {
        url: String,
        content_type: String,
        body: String,
    },
}

/// Transport that records every call and can fail on the n-th one.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Recorded>>,
    fail_on_call: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call with this zero-based index (counting GETs and POSTs)
    pub fn failing_on(call: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Recorded) -> TransportResult<Vec<u8>> {
        let mut calls = self.calls.lock().unwrap();
        if self.fail_on_call == Some(calls.len()) {
            return Err(TransportError::Other(anyhow::anyhow!(
                "connection refused"
            )));
        }
        calls.push(call);
        Ok(b"1".to_vec())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, url: &str) -> TransportResult<Vec<u8>> {
        self.record(Recorded::Get {
            url: url.to_string(),
        })
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> TransportResult<Vec<u8>> {
        self.record(Recorded::Post {
            url: url.to_string(),
            content_type: content_type.to_string(),
            body: String::from_utf8(body).unwrap(),
        })
    }
}

/// Decode the base64 JSON carried in a `data=` form value or query parameter.
pub fn decode_data(query: &str) -> serde_json::Value {
    let data = url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "data")
        .map(|(_, v)| v.into_owned())
        .expect("data parameter present");
    let json = BASE64_STANDARD.decode(data).unwrap();
    serde_json::from_slice(&json).unwrap()
}

/// Query string portion of a URL
pub fn query_of(url: &str) -> &str {
    url.split_once('?').map(|(_, q)| q).unwrap_or("")
}
