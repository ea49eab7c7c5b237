use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{Endpoints, HttpConfig};
use crate::error::Result;
use crate::models::{ProfileUpdate, TrackEvent, TrackOptions};
use crate::payload::{data_params, PayloadBuilder};
use crate::transport::{HttpTransport, Transport};

pub const TRACK_PATH: &str = "track";
pub const ENGAGE_PATH: &str = "engage";

/// Client for the ingestion API: events and profile updates.
///
/// Only the project token is needed; it is read-only after construction, so
/// a client can be cloned and shared between tasks freely.
#[derive(Clone)]
pub struct TrackingClient {
    pub(crate) payloads: PayloadBuilder,
    pub(crate) endpoints: Endpoints,
    pub(crate) transport: Arc<dyn Transport>,
}

impl TrackingClient {
    /// Client for the production endpoints over HTTPS
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let transport = HttpTransport::new(&HttpConfig::default())?;
        Ok(Self::with_transport(
            token,
            Endpoints::default(),
            Arc::new(transport),
        ))
    }

    pub fn with_transport(
        token: impl Into<String>,
        endpoints: Endpoints,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            payloads: PayloadBuilder::new(token),
            endpoints,
            transport,
        }
    }

    /// Build the complete `/track/` URL for an event without sending it.
    ///
    /// Useful for tracking pixels and links embedded in emails.
    pub fn track_url(&self, event: &TrackEvent, options: &TrackOptions) -> Result<String> {
        let json = self.payloads.build_track_payload(event)?;
        let mut url = format!(
            "{}/{}/?{}",
            self.endpoints.track_host,
            TRACK_PATH,
            data_params(&json).encode()
        );

        let modifiers = options.to_params();
        if !modifiers.is_empty() {
            url.push('&');
            url.push_str(&modifiers.encode());
        }
        Ok(url)
    }

    /// Send one event. Returns the raw response body.
    pub async fn track(&self, event: &TrackEvent, options: &TrackOptions) -> Result<Vec<u8>> {
        let url = self.track_url(event, options)?;
        debug!(event = %event.name, distinct_id = %event.distinct_id, "tracking event");

        Ok(self.transport.get(&url).await?)
    }

    pub fn engage_url(&self, update: &ProfileUpdate) -> Result<String> {
        let json = self.payloads.build_profile_payload(update)?;
        Ok(format!(
            "{}/{}/?{}",
            self.endpoints.engage_host,
            ENGAGE_PATH,
            data_params(&json).encode()
        ))
    }

    /// Apply one profile operation. Returns the raw response body.
    pub async fn engage(&self, update: &ProfileUpdate) -> Result<Vec<u8>> {
        let url = self.engage_url(update)?;
        info!(
            operation = update.operation.key(),
            distinct_id = %update.distinct_id,
            "sending profile update"
        );

        Ok(self.transport.get(&url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Properties;
    use crate::transport::TransportResult;
    use async_trait::async_trait;
    use base64::prelude::*;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn get(&self, _url: &str) -> TransportResult<Vec<u8>> {
            Ok(b"1".to_vec())
        }

        async fn post(
            &self,
            _url: &str,
            _content_type: &str,
            _body: Vec<u8>,
        ) -> TransportResult<Vec<u8>> {
            Ok(b"1".to_vec())
        }
    }

    fn client() -> TrackingClient {
        TrackingClient::with_transport(
            "token123",
            Endpoints::single_host("http://mock"),
            Arc::new(NullTransport),
        )
    }

    fn decode_data(url: &str) -> serde_json::Value {
        let parsed = url::Url::parse(url).unwrap();
        let (_, data) = parsed.query_pairs().find(|(k, _)| k == "data").unwrap();
        let json = BASE64_STANDARD.decode(data.as_bytes()).unwrap();
        serde_json::from_slice(&json).unwrap()
    }

    #[test]
    fn test_track_url_shape() {
        let url = client()
            .track_url(&TrackEvent::new("u1", "Signed Up"), &TrackOptions::default())
            .unwrap();

        assert!(url.starts_with("http://mock/track/?data="));
        assert!(!url.contains('&'));
        assert_eq!(decode_data(&url)["event"], "Signed Up");
    }

    #[test]
    fn test_track_url_appends_modifiers_after_data() {
        let options = TrackOptions {
            img: true,
            redirect: Some("https://example.com/a b".to_string()),
            ..Default::default()
        };
        let url = client()
            .track_url(&TrackEvent::new("u1", "Opened Email"), &options)
            .unwrap();

        let (_, query) = url.split_once('?').unwrap();
        assert!(query.starts_with("data="));
        assert!(url.ends_with("&img=1&redirect=https%3A%2F%2Fexample.com%2Fa+b"));
    }

    #[test]
    fn test_engage_url_shape() {
        let update = ProfileUpdate::set("u1", Properties::new().insert("Plan", "Pro"));
        let url = client().engage_url(&update).unwrap();

        assert!(url.starts_with("http://mock/engage/?data="));
        let json = decode_data(&url);
        assert_eq!(json["$set"]["Plan"], "Pro");
        assert_eq!(json["$token"], "token123");
    }

    #[tokio::test]
    async fn test_track_returns_raw_body() {
        let body = client()
            .track(&TrackEvent::new("u1", "Signed Up"), &TrackOptions::default())
            .await
            .unwrap();
        assert_eq!(body, b"1");
    }
}
