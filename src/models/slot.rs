use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookable time unit, scoped to one office.
///
/// The canonical representation is an epoch-millisecond timestamp: totally
/// ordered, unambiguous across time zones and DST transitions. Rendering
/// "10:00 AM" labels is a client concern.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct SlotTime(pub i64);

impl SlotTime {
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for SlotTime {
    fn from(dt: DateTime<Utc>) -> Self {
        SlotTime(dt.timestamp_millis())
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}
