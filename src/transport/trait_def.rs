use async_trait::async_trait;

use crate::error::TransportError;

pub type TransportResult<T> = Result<T, TransportError>;

/// Performs the HTTP exchange for the clients.
///
/// Implementations return the raw response body. Status codes are not
/// interpreted; a response is only an error when the exchange itself fails.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request to a fully built URL
    async fn get(&self, url: &str) -> TransportResult<Vec<u8>>;

    /// Issue a POST request with the given content type and body
    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> TransportResult<Vec<u8>>;
}
