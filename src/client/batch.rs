use tracing::{debug, info, warn};

use super::tracking::{TrackingClient, TRACK_PATH};
use crate::error::{MixpanelError, Result};
use crate::models::{TrackEvent, TrackOptions};
use crate::params::with_query;
use crate::payload::data_params;

/// Most events the `/track` endpoint accepts in one request
pub const BATCH_SIZE: usize = 50;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Outcome of a fully delivered batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub chunks_sent: usize,
    pub events_sent: usize,
}

impl TrackingClient {
    /// Send events in chunks of at most [`BATCH_SIZE`], one POST per chunk.
    ///
    /// Chunks go out sequentially in input order. The first failure stops the
    /// batch: if nothing was delivered yet the underlying error is returned
    /// as is, otherwise it is wrapped in
    /// [`MixpanelError::PartialBatchFailure`] so the caller knows which events
    /// (from `chunk_index * BATCH_SIZE` on) were not sent.
    ///
    /// Every event is validated before the first chunk goes out.
    pub async fn track_batch(
        &self,
        events: &[TrackEvent],
        options: &TrackOptions,
    ) -> Result<BatchSummary> {
        events.iter().try_for_each(TrackEvent::validate)?;

        let url = with_query(
            &format!("{}/{}", self.endpoints.track_host, TRACK_PATH),
            &options.to_params(),
        );

        let mut summary = BatchSummary::default();
        for (chunk_index, chunk) in events.chunks(BATCH_SIZE).enumerate() {
            if let Err(e) = self.send_chunk(&url, chunk).await {
                warn!(
                    chunk_index,
                    chunks_sent = summary.chunks_sent,
                    error = %e,
                    "batch aborted"
                );
                return Err(if summary.chunks_sent == 0 {
                    e
                } else {
                    MixpanelError::PartialBatchFailure {
                        chunk_index,
                        chunks_sent: summary.chunks_sent,
                        events_sent: summary.events_sent,
                        source: Box::new(e),
                    }
                });
            }

            summary.chunks_sent += 1;
            summary.events_sent += chunk.len();
            debug!(chunk_index, event_count = chunk.len(), "batch chunk sent");
        }

        info!(
            chunks = summary.chunks_sent,
            events = summary.events_sent,
            "batch delivered"
        );
        Ok(summary)
    }

    async fn send_chunk(&self, url: &str, chunk: &[TrackEvent]) -> Result<Vec<u8>> {
        let json = self.payloads.build_batch_payload(chunk)?;
        let body = data_params(&json).encode().into_bytes();

        Ok(self.transport.post(url, FORM_CONTENT_TYPE, body).await?)
    }
}
