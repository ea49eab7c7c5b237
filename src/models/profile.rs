use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use super::{DistinctId, Properties};

// Reserved profile properties with special meaning in reports
pub const FIRST_NAME: &str = "$first_name";
pub const LAST_NAME: &str = "$last_name";
pub const NAME: &str = "$name";
pub const CREATED: &str = "$created";
pub const EMAIL: &str = "$email";
pub const PHONE: &str = "$phone";

const MIXPANEL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Renders a timestamp the way Mixpanel expects datetime properties
/// such as `$created`.
pub fn format_mixpanel_time(time: DateTime<Utc>) -> String {
    time.format(MIXPANEL_TIME_FORMAT).to_string()
}

/// The single mutation carried by a profile update.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOperation {
    /// Overwrite properties
    Set(Properties),
    /// Set properties only if they are not already present
    SetOnce(Properties),
    /// Increment numeric properties by the given amounts
    Add(Properties),
    /// Append values to list properties
    Append(Properties),
    /// Merge values into list properties, skipping duplicates
    Union(Properties),
    /// Remove the named properties
    Unset(Vec<String>),
    /// Delete the whole profile
    Delete,
}

impl ProfileOperation {
    pub fn key(&self) -> &'static str {
        match self {
            ProfileOperation::Set(_) => "$set",
            ProfileOperation::SetOnce(_) => "$set_once",
            ProfileOperation::Add(_) => "$add",
            ProfileOperation::Append(_) => "$append",
            ProfileOperation::Union(_) => "$union",
            ProfileOperation::Unset(_) => "$unset",
            ProfileOperation::Delete => "$delete",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            ProfileOperation::Set(props)
            | ProfileOperation::SetOnce(props)
            | ProfileOperation::Add(props)
            | ProfileOperation::Append(props)
            | ProfileOperation::Union(props) => Value::from(props.clone()),
            ProfileOperation::Unset(names) => {
                Value::Array(names.iter().cloned().map(Value::String).collect())
            }
            ProfileOperation::Delete => Value::String(String::new()),
        }
    }
}

/// Serializes as a one-entry map so it can be flattened into the engage body.
impl Serialize for ProfileOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key(), &self.payload())?;
        map.end()
    }
}

/// A mutation to one user profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub distinct_id: DistinctId,
    pub operation: ProfileOperation,
    /// Sent as `$ip` only when present; never inferred from the connection
    pub ip: Option<String>,
    /// Defaults to the moment the payload is encoded
    pub time: Option<DateTime<Utc>>,
    /// Leave the profile's "Last Seen" untouched
    pub ignore_time: bool,
}

impl ProfileUpdate {
    pub fn new(distinct_id: impl Into<DistinctId>, operation: ProfileOperation) -> Self {
        Self {
            distinct_id: distinct_id.into(),
            operation,
            ip: None,
            time: None,
            ignore_time: false,
        }
    }

    pub fn set(distinct_id: impl Into<DistinctId>, properties: Properties) -> Self {
        Self::new(distinct_id, ProfileOperation::Set(properties))
    }

    pub fn set_once(distinct_id: impl Into<DistinctId>, properties: Properties) -> Self {
        Self::new(distinct_id, ProfileOperation::SetOnce(properties))
    }

    pub fn add(distinct_id: impl Into<DistinctId>, increments: Properties) -> Self {
        Self::new(distinct_id, ProfileOperation::Add(increments))
    }

    pub fn append(distinct_id: impl Into<DistinctId>, values: Properties) -> Self {
        Self::new(distinct_id, ProfileOperation::Append(values))
    }

    pub fn union(distinct_id: impl Into<DistinctId>, values: Properties) -> Self {
        Self::new(distinct_id, ProfileOperation::Union(values))
    }

    pub fn unset<I, S>(distinct_id: impl Into<DistinctId>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            distinct_id,
            ProfileOperation::Unset(names.into_iter().map(Into::into).collect()),
        )
    }

    pub fn delete(distinct_id: impl Into<DistinctId>) -> Self {
        Self::new(distinct_id, ProfileOperation::Delete)
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn ignore_time(mut self) -> Self {
        self.ignore_time = true;
        self
    }
}
