pub mod batch;
pub mod data;
pub mod tracking;

pub use batch::{BatchSummary, BATCH_SIZE};
pub use data::DataClient;
pub use tracking::TrackingClient;
