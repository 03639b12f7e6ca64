use rocket::request::{FromRequest, Outcome};
use rocket::Request;

use crate::data::store::Store;
use crate::data::user::User;
use crate::policy::Principal;
use crate::resp::jwt::{auth_problem, extract_claims};
use crate::resp::problem::{problems, Problem};
use crate::security::Security;

/// Problem a guard failed with, kept for the 401/403 catchers.
#[derive(Debug, Clone, Default)]
pub struct GuardProblem(pub Option<Problem>);

impl GuardProblem {
    pub fn of(req: &Request<'_>) -> Option<Problem> {
        req.local_cache(GuardProblem::default).0.clone()
    }
}

fn reject<T>(req: &Request<'_>, problem: Problem) -> Outcome<T, Problem> {
    let status = problem.status;
    req.local_cache(|| GuardProblem(Some(problem.clone())));
    Outcome::Error((status, problem))
}

async fn resolve_user(req: &Request<'_>) -> Result<User, Problem> {
    let security = req
        .rocket()
        .state::<Security>()
        .ok_or_else(problems::internal)?;
    let store = req.rocket().state::<Store>().ok_or_else(problems::internal)?;

    let claims = extract_claims(req, &security.jwt_keys.public)?;

    // Accounts deleted after the token was issued lose access right away.
    store
        .get_user(claims.user)
        .await?
        .filter(|user| user.state.is_active())
        .ok_or_else(|| auth_problem("Token is not valid."))
}

/// Active account the bearer token was issued to.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        tracing::debug!("resolving authenticated user");
        match resolve_user(req).await {
            Ok(user) => Outcome::Success(user),
            Err(problem) => {
                tracing::debug!("authentication failed: {}", problem);
                reject(req, problem)
            }
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Principal {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        req.guard::<User>().await.map(|user| Principal::from(&user))
    }
}

/// Principal that passed the teacher gate.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Teacher(pub Principal);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Teacher {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.guard::<Principal>().await {
            Outcome::Success(principal) if principal.role().is_teacher() => {
                Outcome::Success(Teacher(principal))
            }
            Outcome::Success(_) => reject(req, problems::forbidden()),
            Outcome::Error(e) => Outcome::Error(e),
            Outcome::Forward(status) => Outcome::Forward(status),
        }
    }
}
