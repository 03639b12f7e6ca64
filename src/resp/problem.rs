use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Error response. Serialized as `{ "message": ... }` plus any extra body fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub message: String,

    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            message: problems::GENERIC_FAILURE.to_string(),
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new(status: Status, message: impl ToString) -> Problem {
        Problem {
            status,
            message: message.to_string(),
            ..Default::default()
        }
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut body = self.body;
        body.insert(String::from("message"), Value::from(self.message));

        let body_string = Value::Object(body).to_string();

        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    pub const GENERIC_FAILURE: &str = "Something went wrong!";

    #[inline]
    pub fn bad_request(message: impl ToString) -> Problem {
        Problem::new(Status::BadRequest, message)
    }

    #[inline]
    pub fn missing_field(field: &str) -> Problem {
        bad_request(format!("Field '{}' is required.", field))
            .insert_str("field", field)
            .to_owned()
    }

    #[inline]
    pub fn parse_problem() -> Problem {
        bad_request("Invalid request body.")
    }

    #[inline]
    pub fn unauthorized(message: impl ToString) -> Problem {
        Problem::new(Status::Unauthorized, message)
    }

    #[inline]
    pub fn forbidden() -> Problem {
        Problem::new(Status::Forbidden, "Access denied. Teacher role required.")
    }

    #[inline]
    pub fn not_found(message: impl ToString) -> Problem {
        Problem::new(Status::NotFound, message)
    }

    #[inline]
    pub fn route_not_found() -> Problem {
        not_found("API route not found")
    }

    #[inline]
    pub fn internal() -> Problem {
        Problem::new(Status::InternalServerError, GENERIC_FAILURE)
    }
}

impl From<crate::error::StoreError> for Problem {
    fn from(e: crate::error::StoreError) -> Self {
        use crate::error::StoreError;
        use mongodb::error::ErrorKind;

        let source = match &e {
            StoreError::Duplicate => "duplicate key",
            StoreError::BsonSer(_) | StoreError::BsonDe(_) => "bson conversion",
            StoreError::Database(db) => match db.kind.as_ref() {
                ErrorKind::Authentication { .. }
                | ErrorKind::DnsResolve { .. }
                | ErrorKind::ServerSelection { .. }
                | ErrorKind::InvalidTlsConfig { .. }
                | ErrorKind::IncompatibleServer { .. } => "database access",
                ErrorKind::Io(_) => "database io",
                ErrorKind::Write(_) | ErrorKind::BulkWrite(_) => "database write",
                ErrorKind::InvalidArgument { .. } | ErrorKind::Command(_) => "bad database request",
                _ => "database",
            },
        };
        tracing::error!("storage failure ({}): {}", source, e);

        problems::internal()
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => problems::unauthorized("Token has expired."),
            _ => problems::unauthorized("Token is not valid."),
        }
    }
}
