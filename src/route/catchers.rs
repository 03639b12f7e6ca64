use rocket::http::Status;
use rocket::{Catcher, Request};

use crate::middleware::auth::GuardProblem;
use crate::resp::jwt::auth_problem;
use crate::resp::problem::{problems, Problem};

#[catch(400)]
fn bad_request(req: &Request<'_>) -> Problem {
    GuardProblem::of(req).unwrap_or_else(problems::parse_problem)
}

#[catch(401)]
fn unauthorized(req: &Request<'_>) -> Problem {
    GuardProblem::of(req).unwrap_or_else(|| auth_problem("No token, authorization denied."))
}

#[catch(403)]
fn forbidden(req: &Request<'_>) -> Problem {
    GuardProblem::of(req).unwrap_or_else(problems::forbidden)
}

#[catch(404)]
fn not_found() -> Problem {
    problems::route_not_found()
}

#[catch(422)]
fn unprocessable() -> Problem {
    problems::parse_problem()
}

#[catch(500)]
fn internal(req: &Request<'_>) -> Problem {
    tracing::error!("unhandled failure serving {} {}", req.method(), req.uri());
    GuardProblem::of(req).unwrap_or_else(problems::internal)
}

#[catch(default)]
fn any_status(status: Status, req: &Request<'_>) -> Problem {
    GuardProblem::of(req).unwrap_or_else(|| match status.code {
        413 => Problem::new(status, "Request body is too large."),
        _ => Problem::new(status, status.reason_lossy()),
    })
}

pub fn catchers() -> Vec<Catcher> {
    catchers![
        bad_request,
        unauthorized,
        forbidden,
        not_found,
        unprocessable,
        internal,
        any_status
    ]
}
