use std::sync::Arc;

use tracing::info;

use crate::config::{Endpoints, HttpConfig};
use crate::error::Result;
use crate::models::{EngageQuery, ExportQuery};
use crate::params::{QueryParams, QueryRequest};
use crate::signature::SignedRequest;
use crate::transport::{HttpTransport, Transport};

pub const EXPORT_PATH: &str = "api/2.0/export";
pub const ENGAGE_QUERY_PATH: &str = "api/2.0/engage";

/// Client for the signed data APIs (raw export and people queries).
#[derive(Clone)]
pub struct DataClient {
    api_key: String,
    api_secret: String,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
}

impl DataClient {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Result<Self> {
        let transport = HttpTransport::new(&HttpConfig::default())?;
        Ok(Self::with_transport(
            api_key,
            api_secret,
            Endpoints::default(),
            Arc::new(transport),
        ))
    }

    pub fn with_transport(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        endpoints: Endpoints,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            endpoints,
            transport,
        }
    }

    /// Signed parameters for `request`, with a fresh expiry.
    pub fn signed_params(&self, request: &dyn QueryRequest) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        request.append_params(&mut params)?;

        Ok(SignedRequest::new(params, &self.api_key, &self.api_secret).finish())
    }

    fn signed_url(&self, host: &str, path: &str, request: &dyn QueryRequest) -> Result<String> {
        let params = self.signed_params(request)?;
        Ok(format!("{}/{}/?{}", host, path, params.encode()))
    }

    /// Build the signed export URL. The date range is validated first.
    pub fn export_url(&self, query: &ExportQuery) -> Result<String> {
        self.signed_url(&self.endpoints.export_host, EXPORT_PATH, query)
    }

    /// Download raw events. Returns the response body untouched
    /// (newline-delimited JSON on success).
    pub async fn export(&self, query: &ExportQuery) -> Result<Vec<u8>> {
        let url = self.export_url(query)?;
        info!(
            from_date = %query.from_date,
            to_date = %query.to_date,
            events = query.events.len(),
            "exporting events"
        );

        Ok(self.transport.get(&url).await?)
    }

    pub fn engage_query_url(&self, query: &EngageQuery) -> Result<String> {
        self.signed_url(&self.endpoints.query_host, ENGAGE_QUERY_PATH, query)
    }

    /// Query people profiles. Returns the response body untouched.
    pub async fn engage_query(&self, query: &EngageQuery) -> Result<Vec<u8>> {
        let url = self.engage_query_url(query)?;
        info!(page = ?query.page, "querying profiles");

        Ok(self.transport.get(&url).await?)
    }
}
