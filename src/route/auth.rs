use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Config;
use crate::data::store::Store;
use crate::data::user::db::{UserLoginData, UserSignupData};
use crate::data::user::{User, UserResponse};
use crate::resp::jwt::{clear_auth_cookie, UserRoleToken};
use crate::resp::problem::{problems, Problem};
use crate::resp::MessageResponse;
use crate::security::Security;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

/// Signs a fresh token for the user and stores it in the auth cookie.
fn issue_token(
    user: &User,
    cookies: &CookieJar<'_>,
    config: &Config,
    security: &Security,
) -> Result<String, Problem> {
    let token = UserRoleToken::new(user, config.token_validity());
    let encoded = token
        .encode_jwt(&security.jwt_keys.private)
        .map_err(|e| {
            tracing::error!("unable to sign auth token: {}", e);
            problems::internal()
        })?;

    cookies.add(token.cookie(encoded.clone()));
    Ok(encoded)
}

/// Register a teacher account
#[utoipa::path(
    request_body = UserSignupData,
    responses(
        (status = 201, description = "Teacher registered", body = AuthResponse),
        (status = 400, description = "Invalid fields or email taken", body = MessageResponse),
    )
)]
#[post("/auth/register", data = "<signup>")]
#[tracing::instrument(skip(cookies, store, config, security))]
pub async fn register(
    signup: Json<UserSignupData>,
    cookies: &CookieJar<'_>,
    store: &State<Store>,
    config: &State<Config>,
    security: &State<Security>,
) -> Result<(Status, Json<AuthResponse>), Problem> {
    let user = store.register_teacher(signup.into_inner(), security).await?;
    let token = issue_token(&user, cookies, config, security)?;

    Ok((
        Status::Created,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// Exchange credentials for a token
#[utoipa::path(
    request_body = UserLoginData,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
    )
)]
#[post("/auth/login", data = "<login>")]
#[tracing::instrument(skip(cookies, store, config, security))]
pub async fn login(
    login: Json<UserLoginData>,
    cookies: &CookieJar<'_>,
    store: &State<Store>,
    config: &State<Config>,
    security: &State<Security>,
) -> Result<Json<AuthResponse>, Problem> {
    let user = store.authenticate(&login, security).await?;
    let token = issue_token(&user, cookies, config, security)?;
    tracing::info!("{} {} logged in", user.role, user.id);

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from(&user),
    }))
}

/// Drop the auth cookie
#[utoipa::path(
    responses(
        (status = 200, description = "Cookie cleared", body = MessageResponse),
    )
)]
#[post("/auth/logout")]
#[tracing::instrument(skip(cookies))]
pub fn logout(cookies: &CookieJar<'_>) -> Json<MessageResponse> {
    clear_auth_cookie(cookies);
    Json(MessageResponse::new("Logged out successfully"))
}

/// Profile of the authenticated caller
#[utoipa::path(
    responses(
        (status = 200, description = "Caller profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
    ),
    security(("jwt" = []))
)]
#[get("/auth/me")]
#[tracing::instrument(skip(user), fields(user_id = %user.id))]
pub fn me(user: User) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

#[cfg(test)]
mod auth_endpoints {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};

    use crate::resp::jwt::HasAuthCookie;
    use crate::testing;

    fn credentials() -> Value {
        json!({ "name": "Ada", "email": "Ada@X.com", "password": "hunter22" })
    }

    #[rocket::async_test]
    async fn registered_teachers_can_log_in() {
        let (client, _) = testing::client().await;

        let response = client
            .post("/api/auth/register")
            .header(ContentType::JSON)
            .body(credentials().to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let registered: Value = response.into_json().await.unwrap();
        assert_eq!(registered["user"]["role"], "teacher");
        assert_eq!(registered["user"]["email"], "ada@x.com");

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(json!({ "email": "ada@x.com", "password": "hunter22" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let claims = response
            .get_auth_cookie(&testing::security().jwt_keys.public)
            .expect("jwt_auth cookie wasn't present");
        let logged_in: Value = response.into_json().await.unwrap();
        assert_eq!(logged_in["user"]["id"], registered["user"]["id"]);
        assert_eq!(claims.user.to_string(), logged_in["user"]["id"].as_str().unwrap());

        let token = logged_in["token"].as_str().unwrap();
        let response = client
            .get("/api/auth/me")
            .header(rocket::http::Header::new(
                "Authorization",
                format!("Bearer {}", token),
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let me: Value = response.into_json().await.unwrap();
        assert_eq!(me["name"], "Ada");
    }

    #[rocket::async_test]
    async fn duplicate_registration_is_rejected() {
        let (client, _) = testing::client().await;

        for expected in [Status::Created, Status::BadRequest] {
            let response = client
                .post("/api/auth/register")
                .header(ContentType::JSON)
                .body(credentials().to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), expected);
        }
    }

    #[rocket::async_test]
    async fn wrong_password_is_unauthorized() {
        let (client, _) = testing::client().await;

        client
            .post("/api/auth/register")
            .header(ContentType::JSON)
            .body(credentials().to_string())
            .dispatch()
            .await;

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(json!({ "email": "ada@x.com", "password": "hunter23" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
        let problem: Value = response.into_json().await.unwrap();
        assert_eq!(problem["message"], "Invalid credentials");
    }

    #[rocket::async_test]
    async fn health_and_unknown_routes() {
        let (client, _) = testing::client().await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let health: Value = response.into_json().await.unwrap();
        assert_eq!(health["message"], "Tuition Center API is running!");
        assert!(health["timestamp"].is_string());

        let response = client.get("/api/nothing-here").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let problem: Value = response.into_json().await.unwrap();
        assert_eq!(problem["message"], "API route not found");
    }
}
