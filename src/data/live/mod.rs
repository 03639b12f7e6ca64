use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

use crate::data::store::Record;
use crate::data::subject::Subject;
use crate::data::user::UserIdentity;
use crate::data::RecordState;
use crate::policy::Scoped;

pub static LIVE_COLLECTION_NAME: &str = "lives";

/// Scheduled online class, referenced by an opaque meeting link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    #[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]
    pub id: Uuid,
    pub title: String,
    pub meet_link: String,
    pub subject: Subject,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(with = "bson::serde_helpers::uuid_1_as_binary")]
    pub created_by: Uuid,
    #[serde(rename = "isActive", default)]
    pub state: RecordState,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Record for LiveSession {
    const COLLECTION: &'static str = LIVE_COLLECTION_NAME;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for LiveSession {
    fn owner(&self) -> Option<Uuid> {
        Some(self.created_by)
    }

    fn subject(&self) -> Option<&Subject> {
        Some(&self.subject)
    }

    fn state(&self) -> RecordState {
        self.state
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveSessionCreateData {
    pub title: String,
    pub meet_link: String,
    pub subject: String,
    /// RFC 3339 timestamp.
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveSessionResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub meet_link: String,
    #[schema(value_type = String)]
    pub subject: Subject,
    pub scheduled_at: DateTime<Utc>,
    pub description: String,
    pub created_by: Option<UserIdentity>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LiveSessionResponse {
    pub fn new(session: LiveSession, created_by: Option<UserIdentity>) -> LiveSessionResponse {
        LiveSessionResponse {
            id: session.id,
            title: session.title,
            meet_link: session.meet_link,
            subject: session.subject,
            scheduled_at: session.scheduled_at,
            description: session.description,
            created_by,
            is_active: session.state.is_active(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveSessionMessageResponse {
    pub message: String,
    pub live_session: LiveSessionResponse,
}
