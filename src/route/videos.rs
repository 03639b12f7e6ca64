use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::parse_id;
use crate::data::store::Store;
use crate::data::video::db::{problem, VideoManager};
use crate::data::video::{VideoCreateData, VideoMessageResponse, VideoResponse};
use crate::middleware::auth::Teacher;
use crate::policy::Principal;
use crate::resp::problem::Problem;
use crate::resp::MessageResponse;

/// Videos visible to the caller
#[utoipa::path(
    responses(
        (status = 200, description = "Own uploads for teachers, subject videos for students", body = Vec<VideoResponse>),
    ),
    security(("jwt" = []))
)]
#[get("/videos")]
#[tracing::instrument(skip(store))]
pub async fn video_list(
    principal: Principal,
    store: &State<Store>,
) -> Result<Json<Vec<VideoResponse>>, Problem> {
    Ok(Json(VideoManager::new(store).list(&principal).await?))
}

/// Publish a video
#[utoipa::path(
    request_body = VideoCreateData,
    responses(
        (status = 201, description = "Video added", body = VideoMessageResponse),
        (status = 400, description = "Missing fields", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[post("/videos", data = "<data>")]
#[tracing::instrument(skip(store))]
pub async fn video_create(
    teacher: Teacher,
    data: Json<VideoCreateData>,
    store: &State<Store>,
) -> Result<(Status, Json<VideoMessageResponse>), Problem> {
    let video = VideoManager::new(store)
        .create(&teacher.0, data.into_inner())
        .await?;

    Ok((
        Status::Created,
        Json(VideoMessageResponse {
            message: "Video added successfully".to_string(),
            video,
        }),
    ))
}

/// Soft-delete one of the caller's videos
#[utoipa::path(
    responses(
        (status = 200, description = "Video deleted", body = MessageResponse),
        (status = 404, description = "No such video owned by the caller", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[delete("/videos/<id>")]
#[tracing::instrument(skip(store))]
pub async fn video_delete(
    id: &str,
    teacher: Teacher,
    store: &State<Store>,
) -> Result<Json<MessageResponse>, Problem> {
    let id = parse_id(id, problem::not_found)?;
    VideoManager::new(store).remove(&teacher.0, id).await?;

    Ok(Json(MessageResponse::new("Video deleted successfully")))
}
