use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod filter;
pub mod live;
pub mod serde_helpers;
pub mod store;
pub mod student;
pub mod subject;
pub mod user;
pub mod video;

/// BSON datetimes only keep milliseconds.
pub fn stored_time(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

pub fn stored_now() -> DateTime<Utc> {
    stored_time(Utc::now())
}

/// Lifecycle of a stored record. Records are never physically removed.
///
/// Stored as the `isActive` flag so documents stay queryable with a plain
/// `{ "isActive": true }` filter.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum RecordState {
    #[default]
    Active,
    Deleted,
}

impl RecordState {
    pub fn is_active(self) -> bool {
        self == RecordState::Active
    }
}

impl From<bool> for RecordState {
    fn from(active: bool) -> Self {
        if active {
            RecordState::Active
        } else {
            RecordState::Deleted
        }
    }
}

impl Serialize for RecordState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_active())
    }
}

impl<'de> Deserialize<'de> for RecordState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(RecordState::from)
    }
}
