use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

use crate::data::subject::Subjects;
use crate::data::user::User;

/// Student account without credentials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(value_type = Vec<String>)]
    pub subjects: Subjects,
    pub created_at: DateTime<Utc>,
}

impl From<User> for StudentResponse {
    fn from(user: User) -> Self {
        StudentResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            subjects: user.subjects,
            created_at: user.created_at,
        }
    }
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct StudentCreateData {
    pub name: String,
    #[schema(format = "email")]
    pub email: String,
    #[schema(format = "password")]
    pub password: String,
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
}

impl std::fmt::Debug for StudentCreateData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StudentCreateData:{}", self.email)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubjectsUpdateData {
    /// Replaces the current subjects; omitted or `null` means none.
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentMessageResponse {
    pub message: String,
    pub student: StudentResponse,
}
