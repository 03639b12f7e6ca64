use std::collections::BTreeMap;

use rocket::{Build, Rocket, Route};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

pub mod auth;
pub mod catchers;
pub mod health;
pub mod lives;
pub mod students;
pub mod videos;

use auth::*;
use health::*;
use lives::*;
use students::*;
use videos::*;

use crate::{
    data::{
        live::{LiveSessionCreateData, LiveSessionMessageResponse, LiveSessionResponse},
        student::{StudentCreateData, StudentMessageResponse, StudentResponse, SubjectsUpdateData},
        user::db::{UserLoginData, UserSignupData},
        user::{UserIdentity, UserResponse},
        video::{VideoCreateData, VideoMessageResponse, VideoResponse},
    },
    resp::{jwt::doc::JWTAuth, problem::Problem, MessageResponse},
    role::Role,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        register,
        login,
        logout,
        me,
        student_list,
        student_create,
        student_subjects_update,
        student_delete,
        video_list,
        video_create,
        video_delete,
        live_list,
        live_create,
        live_delete
    ),
    components(schemas(
        Role,
        MessageResponse,
        HealthResponse,
        AuthResponse,
        UserResponse,
        UserIdentity,
        UserLoginData,
        UserSignupData,
        StudentResponse,
        StudentCreateData,
        SubjectsUpdateData,
        StudentMessageResponse,
        VideoResponse,
        VideoCreateData,
        VideoMessageResponse,
        LiveSessionResponse,
        LiveSessionCreateData,
        LiveSessionMessageResponse
    )),
    modifiers(&JWTAuth, &API_PREFIX)
)]
pub struct ApiDoc;

pub struct PathPrefix(pub &'static str);
static API_PREFIX: PathPrefix = PathPrefix("/api");

impl utoipa::Modify for PathPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut new_paths = BTreeMap::new();

        for (path, item) in std::mem::take(&mut openapi.paths.paths) {
            new_paths.insert(self.0.to_string() + path.as_ref(), item);
        }

        openapi.paths.paths = new_paths;
    }
}

/// Path ids that aren't UUIDs can't name a stored record.
pub(crate) fn parse_id(id: &str, not_found: fn() -> Problem) -> Result<Uuid, Problem> {
    Uuid::parse_str(id).map_err(|_| not_found())
}

pub fn api() -> Vec<Route> {
    routes![
        health_check,
        register,
        login,
        logout,
        me,
        student_list,
        student_create,
        student_subjects_update,
        student_delete,
        video_list,
        video_create,
        video_delete,
        live_list,
        live_create,
        live_delete
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/api", api())
        .mount(
            "/",
            SwaggerUi::new("/swagger/<_..>").url("/api/openapi.json", ApiDoc::openapi()),
        )
        .register("/", catchers::catchers())
}
