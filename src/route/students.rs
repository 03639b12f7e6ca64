use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::parse_id;
use crate::data::store::Store;
use crate::data::student::db::{problem, StudentManager};
use crate::data::student::{
    StudentCreateData, StudentMessageResponse, StudentResponse, SubjectsUpdateData,
};
use crate::middleware::auth::Teacher;
use crate::resp::problem::Problem;
use crate::resp::MessageResponse;
use crate::security::Security;

/// Students created by the calling teacher
#[utoipa::path(
    responses(
        (status = 200, description = "Own students", body = Vec<StudentResponse>),
        (status = 403, description = "Caller is not a teacher", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[get("/students")]
#[tracing::instrument(skip(store, security))]
pub async fn student_list(
    teacher: Teacher,
    store: &State<Store>,
    security: &State<Security>,
) -> Result<Json<Vec<StudentResponse>>, Problem> {
    let students = StudentManager::new(store, security)
        .list(&teacher.0)
        .await?;

    Ok(Json(students))
}

/// Create a student owned by the calling teacher
#[utoipa::path(
    request_body = StudentCreateData,
    responses(
        (status = 201, description = "Student created", body = StudentMessageResponse),
        (status = 400, description = "Invalid fields or email taken", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[post("/students", data = "<data>")]
#[tracing::instrument(skip(store, security))]
pub async fn student_create(
    teacher: Teacher,
    data: Json<StudentCreateData>,
    store: &State<Store>,
    security: &State<Security>,
) -> Result<(Status, Json<StudentMessageResponse>), Problem> {
    let student = StudentManager::new(store, security)
        .create(&teacher.0, data.into_inner())
        .await?;

    Ok((
        Status::Created,
        Json(StudentMessageResponse {
            message: "Student created successfully".to_string(),
            student,
        }),
    ))
}

/// Replace a student's subjects
#[utoipa::path(
    request_body = SubjectsUpdateData,
    responses(
        (status = 200, description = "Subjects replaced", body = StudentMessageResponse),
        (status = 404, description = "No such student owned by the caller", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[put("/students/<id>/subjects", data = "<data>")]
#[tracing::instrument(skip(store, security))]
pub async fn student_subjects_update(
    id: &str,
    teacher: Teacher,
    data: Json<SubjectsUpdateData>,
    store: &State<Store>,
    security: &State<Security>,
) -> Result<Json<StudentMessageResponse>, Problem> {
    let id = parse_id(id, problem::not_found)?;
    let student = StudentManager::new(store, security)
        .update_subjects(&teacher.0, id, data.into_inner())
        .await?;

    Ok(Json(StudentMessageResponse {
        message: "Student subjects updated successfully".to_string(),
        student,
    }))
}

/// Soft-delete a student
#[utoipa::path(
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 404, description = "No such student owned by the caller", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[delete("/students/<id>")]
#[tracing::instrument(skip(store, security))]
pub async fn student_delete(
    id: &str,
    teacher: Teacher,
    store: &State<Store>,
    security: &State<Security>,
) -> Result<Json<MessageResponse>, Problem> {
    let id = parse_id(id, problem::not_found)?;
    StudentManager::new(store, security)
        .remove(&teacher.0, id)
        .await?;

    Ok(Json(MessageResponse::new("Student deleted successfully")))
}
