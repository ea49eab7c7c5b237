pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod params;
pub mod payload;
pub mod signature;
pub mod transport;

pub use client::{BatchSummary, DataClient, TrackingClient, BATCH_SIZE};
pub use config::Endpoints;
pub use error::{MixpanelError, Result, TransportError};
pub use models::{
    DistinctId, EngageQuery, ExportQuery, ProfileOperation, ProfileUpdate, Properties,
    TrackEvent, TrackOptions,
};
pub use transport::{HttpTransport, Transport};
