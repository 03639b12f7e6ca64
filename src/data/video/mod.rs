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

pub static VIDEO_COLLECTION_NAME: &str = "videos";

/// Recorded lesson, referenced by an opaque YouTube link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]
    pub id: Uuid,
    pub title: String,
    pub youtube_link: String,
    pub subject: Subject,
    #[serde(default)]
    pub description: String,
    #[serde(with = "bson::serde_helpers::uuid_1_as_binary")]
    pub uploaded_by: Uuid,
    #[serde(rename = "isActive", default)]
    pub state: RecordState,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Record for Video {
    const COLLECTION: &'static str = VIDEO_COLLECTION_NAME;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for Video {
    fn owner(&self) -> Option<Uuid> {
        Some(self.uploaded_by)
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
pub struct VideoCreateData {
    pub title: String,
    pub youtube_link: String,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub youtube_link: String,
    #[schema(value_type = String)]
    pub subject: Subject,
    pub description: String,
    /// `null` when the uploader's account no longer exists.
    pub uploaded_by: Option<UserIdentity>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn new(video: Video, uploaded_by: Option<UserIdentity>) -> VideoResponse {
        VideoResponse {
            id: video.id,
            title: video.title,
            youtube_link: video.youtube_link,
            subject: video.subject,
            description: video.description,
            uploaded_by,
            is_active: video.state.is_active(),
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoMessageResponse {
    pub message: String,
    pub video: VideoResponse,
}
