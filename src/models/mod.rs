pub mod event;
pub mod profile;
pub mod properties;
pub mod query;

pub use event::{DistinctId, TrackEvent, TrackOptions};
pub use profile::{format_mixpanel_time, ProfileOperation, ProfileUpdate};
pub use properties::Properties;
pub use query::{EngageQuery, ExportQuery};
