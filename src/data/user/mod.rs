use chrono::{DateTime, Utc};
use crypto::bcrypt::bcrypt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

use crate::data::serde_helpers::optional_uuid_as_binary;
use crate::data::store::Record;
use crate::data::subject::{Subject, Subjects};
use crate::data::{stored_now, RecordState};
use crate::policy::Scoped;
use crate::role::Role;
use crate::security::Security;

pub static USER_COLLECTION_NAME: &str = "users";

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PasswordHash([u8; 24]);

impl PasswordHash {
    pub fn new(password: impl AsRef<str>, security: &Security) -> PasswordHash {
        let mut pw_hash: [u8; 24] = [0; 24];

        let mut sha = Sha256::new();
        sha2::Digest::update(&mut sha, password.as_ref().as_bytes());

        bcrypt(
            security.password_cost,
            &security.salt,
            sha.finalize().as_slice(),
            &mut pw_hash,
        );

        PasswordHash(pw_hash)
    }

    pub fn matches(&self, password: impl AsRef<str>, security: &Security) -> bool {
        *self == PasswordHash::new(password, security)
    }
}

/// Stored account of a teacher or a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: PasswordHash,
    pub role: Role,
    #[serde(default)]
    pub subjects: Subjects,
    /// Owning teacher; only set for students.
    #[serde(default, with = "optional_uuid_as_binary")]
    pub created_by: Option<Uuid>,
    #[serde(rename = "isActive", default)]
    pub state: RecordState,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl ToString,
        email: impl ToString,
        password: PasswordHash,
        role: Role,
    ) -> User {
        let id = Uuid::new_v4();
        tracing::info!("Creating a new {} with UUID: {}", role, id);

        let now = stored_now();
        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password,
            role,
            subjects: Subjects::new(),
            created_by: None,
            state: RecordState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = stored_now();
    }
}

impl Record for User {
    const COLLECTION: &'static str = USER_COLLECTION_NAME;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Scoped for User {
    fn owner(&self) -> Option<Uuid> {
        self.created_by
    }

    fn subject(&self) -> Option<&Subject> {
        None
    }

    fn state(&self) -> RecordState {
        self.state
    }
}

/// Public identity joined into videos and live sessions.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserIdentity {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        UserIdentity {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Profile of the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[schema(value_type = Vec<String>)]
    pub subjects: Subjects,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            subjects: user.subjects.clone(),
        }
    }
}
