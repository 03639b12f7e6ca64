use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::parse_id;
use crate::data::live::db::{problem, LiveSessionManager};
use crate::data::live::{LiveSessionCreateData, LiveSessionMessageResponse, LiveSessionResponse};
use crate::data::store::Store;
use crate::middleware::auth::Teacher;
use crate::policy::Principal;
use crate::resp::problem::Problem;
use crate::resp::MessageResponse;

/// Live sessions visible to the caller, earliest first
#[utoipa::path(
    responses(
        (status = 200, description = "Sessions ordered by scheduledAt", body = Vec<LiveSessionResponse>),
    ),
    security(("jwt" = []))
)]
#[get("/lives")]
#[tracing::instrument(skip(store))]
pub async fn live_list(
    principal: Principal,
    store: &State<Store>,
) -> Result<Json<Vec<LiveSessionResponse>>, Problem> {
    Ok(Json(LiveSessionManager::new(store).list(&principal).await?))
}

/// Schedule a live session
#[utoipa::path(
    request_body = LiveSessionCreateData,
    responses(
        (status = 201, description = "Session scheduled", body = LiveSessionMessageResponse),
        (status = 400, description = "Missing fields", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[post("/lives", data = "<data>")]
#[tracing::instrument(skip(store))]
pub async fn live_create(
    teacher: Teacher,
    data: Json<LiveSessionCreateData>,
    store: &State<Store>,
) -> Result<(Status, Json<LiveSessionMessageResponse>), Problem> {
    let live_session = LiveSessionManager::new(store)
        .create(&teacher.0, data.into_inner())
        .await?;

    Ok((
        Status::Created,
        Json(LiveSessionMessageResponse {
            message: "Live session scheduled successfully".to_string(),
            live_session,
        }),
    ))
}

/// Soft-delete one of the caller's live sessions
#[utoipa::path(
    responses(
        (status = 200, description = "Session deleted", body = MessageResponse),
        (status = 404, description = "No such session owned by the caller", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[delete("/lives/<id>")]
#[tracing::instrument(skip(store))]
pub async fn live_delete(
    id: &str,
    teacher: Teacher,
    store: &State<Store>,
) -> Result<Json<MessageResponse>, Problem> {
    let id = parse_id(id, problem::not_found)?;
    LiveSessionManager::new(store)
        .remove(&teacher.0, id)
        .await?;

    Ok(Json(MessageResponse::new("Live session deleted successfully")))
}
