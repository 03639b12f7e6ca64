use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::{Cookie, CookieJar};
use rocket::time::OffsetDateTime;
use rocket::Request;
use serde::{Deserialize, Serialize};

use super::util::date_time_as_unix_seconds;
use crate::data::user::User;
use crate::resp::problem::{problems, Problem};
use crate::role::Role;
use uuid::Uuid;

pub static AUTH_COOKIE_NAME: &str = "jwt_auth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleToken {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    pub user: Uuid,
    /// Role at the time of issue. Authorization always uses the stored role.
    pub role: Role,
}

impl UserRoleToken {
    pub fn new(user: &User, validity: Duration) -> UserRoleToken {
        let now = Utc::now();
        UserRoleToken {
            iat: now,
            exp: now + validity,
            user: user.id,
            role: user.role,
        }
    }

    pub fn encode_jwt(
        &self,
        private_key: impl AsRef<[u8]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::PS256);
        let key = EncodingKey::from_rsa_pem(private_key.as_ref())?;

        encode(&header, &self, &key)
    }

    pub fn decode_jwt(
        token: impl AsRef<str>,
        public_key: impl AsRef<[u8]>,
    ) -> Result<UserRoleToken, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_rsa_pem(public_key.as_ref())?;

        decode::<UserRoleToken>(token.as_ref(), &key, &Validation::new(Algorithm::PS256))
            .map(|data| data.claims)
    }

    pub fn cookie(&self, encoded: impl Into<String>) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE_NAME, encoded.into()))
            .secure(true)
            .expires(OffsetDateTime::from_unix_timestamp(self.exp.timestamp()).ok())
            .path("/")
            .http_only(true)
            .build()
    }
}

pub fn auth_problem(message: impl ToString) -> Problem {
    problems::unauthorized(message)
}

/// Raw token from the `Authorization: Bearer` header, falling back to the auth cookie.
pub fn extract_token(req: &Request<'_>) -> Option<String> {
    let bearer = req.headers().get_one("Authorization").and_then(|value| {
        let (scheme, token) = value.split_once(' ')?;
        if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
            Some(token.trim().to_string())
        } else {
            None
        }
    });

    bearer.or_else(|| {
        req.cookies()
            .get(AUTH_COOKIE_NAME)
            .map(|jwt| jwt.value().to_owned())
    })
}

pub fn extract_claims(
    req: &Request<'_>,
    public_key: impl AsRef<[u8]>,
) -> Result<UserRoleToken, Problem> {
    let token = extract_token(req).ok_or_else(|| auth_problem("No token, authorization denied."))?;
    tracing::trace!("extracted jwt auth from request");

    let claims = UserRoleToken::decode_jwt(token, public_key).map_err(Problem::from)?;
    tracing::debug!("decoded user roles token for user: {}", claims.user);

    Ok(claims)
}

pub fn clear_auth_cookie(cookies: &CookieJar<'_>) {
    cookies.remove(Cookie::build(AUTH_COOKIE_NAME).path("/"));
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> Self {
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            )
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            if let Some(c) = openapi.components.as_mut() {
                c.add_security_scheme("jwt", *self)
            }
        }
    }
}

#[cfg(test)]
pub trait HasAuthCookie {
    fn get_auth_cookie(&self, public_key: impl AsRef<[u8]>) -> Option<UserRoleToken>;
}

#[cfg(test)]
impl HasAuthCookie for rocket::local::asynchronous::LocalResponse<'_> {
    fn get_auth_cookie(&self, public_key: impl AsRef<[u8]>) -> Option<UserRoleToken> {
        let cookie = self.cookies().get(AUTH_COOKIE_NAME)?;
        UserRoleToken::decode_jwt(cookie.value(), public_key).ok()
    }
}
