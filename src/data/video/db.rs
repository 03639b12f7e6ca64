use uuid::Uuid;

use super::{Video, VideoCreateData, VideoResponse};
use crate::data::store::Store;
use crate::data::subject::Subject;
use crate::data::{stored_now, RecordState};
use crate::policy::{self, require_teacher, visible_to, Principal, Visibility};
use crate::resp::problem::{problems, Problem};
use crate::util::non_blank;

/// Field holding the uploading teacher.
pub const OWNER_FIELD: &str = "uploadedBy";

pub mod problem {
    use crate::resp::problem::{problems, Problem};

    #[inline]
    pub fn not_found() -> Problem {
        problems::not_found("Video not found")
    }
}

pub struct VideoManager<'a> {
    store: &'a Store,
}

impl<'a> VideoManager<'a> {
    pub fn new(store: &'a Store) -> VideoManager<'a> {
        VideoManager { store }
    }

    /// Teachers get their own uploads, students every upload in their subjects.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<VideoResponse>, Problem> {
        let visibility = Visibility::of(principal);
        if visibility.is_empty() {
            return Ok(vec![]);
        }

        let videos: Vec<Video> = self
            .store
            .find_records(visibility.filter(OWNER_FIELD), None)
            .await?;
        let videos: Vec<Video> = videos
            .into_iter()
            .filter(|video| visible_to(principal, video))
            .collect();

        let uploaders = self
            .store
            .user_identities(videos.iter().map(|video| video.uploaded_by))
            .await?;

        Ok(videos
            .into_iter()
            .map(|video| {
                let uploader = uploaders.get(&video.uploaded_by).cloned();
                VideoResponse::new(video, uploader)
            })
            .collect())
    }

    pub async fn create(
        &self,
        principal: &Principal,
        data: VideoCreateData,
    ) -> Result<VideoResponse, Problem> {
        let teacher = require_teacher(principal)?;

        let title = non_blank(data.title).ok_or_else(|| problems::missing_field("title"))?;
        let youtube_link =
            non_blank(data.youtube_link).ok_or_else(|| problems::missing_field("youtubeLink"))?;
        let subject =
            Subject::parse(data.subject).ok_or_else(|| problems::missing_field("subject"))?;

        let now = stored_now();
        let video = Video {
            id: Uuid::new_v4(),
            title,
            youtube_link,
            subject,
            description: data.description.unwrap_or_default(),
            uploaded_by: teacher,
            state: RecordState::Active,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_record(&video).await?;
        tracing::info!("teacher {} added video {}", teacher, video.id);

        let uploader = self.store.user_identities([teacher]).await?.remove(&teacher);
        Ok(VideoResponse::new(video, uploader))
    }

    /// Soft-deletes one of the teacher's own videos.
    pub async fn remove(&self, principal: &Principal, id: Uuid) -> Result<(), Problem> {
        let teacher = require_teacher(principal)?;

        let mut video = self
            .store
            .find_record::<Video>(policy::owned_by(teacher, OWNER_FIELD, id))
            .await?
            .filter(|video| visible_to(principal, video))
            .ok_or_else(problem::not_found)?;

        video.state = RecordState::Deleted;
        video.updated_at = stored_now();

        if !self.store.save_record(&video).await? {
            return Err(problem::not_found());
        }

        tracing::info!("teacher {} deleted video {}", teacher, id);
        Ok(())
    }
}
