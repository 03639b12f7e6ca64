use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{PasswordHash, User, UserIdentity};
use crate::data::filter;
use crate::data::store::DocumentStore;
use crate::error::StoreError;
use crate::resp::problem::Problem;
use crate::role::Role;
use crate::security::Security;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub mod problem {
    use crate::resp::problem::{problems, Problem};

    #[inline]
    pub fn bad_email(email: impl ToString, message: impl ToString) -> Problem {
        problems::bad_request(message)
            .insert_str("email", email)
            .to_owned()
    }

    #[inline]
    pub fn bad_name() -> Problem {
        problems::bad_request("Name is required.")
    }

    #[inline]
    pub fn bad_password() -> Problem {
        problems::bad_request(format!(
            "Password must be at least {} characters long.",
            super::MIN_PASSWORD_LENGTH
        ))
    }

    #[inline]
    pub fn bad_login() -> Problem {
        problems::unauthorized("Invalid credentials")
    }
}

/// Lowercased, trimmed email; `None` when it can't be an address.
pub fn normalize_email(email: impl AsRef<str>) -> Option<String> {
    let email = email.as_ref().trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Some(email),
        _ => None,
    }
}

/// Validated account fields, shared by teacher signup and student creation.
#[derive(Clone)]
pub struct AccountFields {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AccountFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountFields:{}", self.email)
    }
}

impl AccountFields {
    pub fn validate(
        name: impl AsRef<str>,
        email: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> Result<AccountFields, Problem> {
        let name = crate::util::non_blank(name).ok_or_else(problem::bad_name)?;
        let email = normalize_email(email.as_ref()).ok_or_else(|| {
            problem::bad_email(email.as_ref(), "Not a valid e-mail address.")
        })?;

        if password.as_ref().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(problem::bad_password());
        }

        Ok(AccountFields {
            name,
            email,
            password: password.as_ref().to_string(),
        })
    }

    pub fn into_user(self, role: Role, security: &Security) -> User {
        let password = PasswordHash::new(&self.password, security);
        User::new(self.name, self.email, password, role)
    }
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct UserSignupData {
    pub name: String,
    #[schema(format = "email")]
    pub email: String,
    #[schema(format = "password")]
    pub password: String,
}

impl std::fmt::Debug for UserSignupData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserSignupData:{}", self.email)
    }
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct UserLoginData {
    #[schema(format = "email")]
    pub email: String,
    #[schema(format = "password")]
    pub password: String,
}

impl std::fmt::Debug for UserLoginData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserLoginData:{}", self.email)
    }
}

impl dyn DocumentStore {
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.find_record(filter::by_id(id)).await
    }

    pub async fn find_user_by_email(
        &self,
        email: impl AsRef<str>,
    ) -> Result<Option<User>, StoreError> {
        self.find_record(filter::by_email(email.as_ref())).await
    }

    /// Public identities of the given users, keyed by id. Unknown ids are skipped.
    pub async fn user_identities(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, UserIdentity>, StoreError> {
        let mut ids: Vec<Uuid> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users: Vec<User> = self.find_records(filter::by_ids(ids), None).await?;
        Ok(users
            .iter()
            .map(|user| (user.id, UserIdentity::from(user)))
            .collect())
    }

    /// Stores a new account, failing when the email is already registered.
    pub async fn create_account(&self, user: User, taken_message: &str) -> Result<User, Problem> {
        if self.find_user_by_email(&user.email).await?.is_some() {
            return Err(problem::bad_email(&user.email, taken_message));
        }

        match self.insert_record(&user).await {
            Ok(()) => Ok(user),
            Err(StoreError::Duplicate) => Err(problem::bad_email(&user.email, taken_message)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn register_teacher(
        &self,
        signup: UserSignupData,
        security: &Security,
    ) -> Result<User, Problem> {
        let fields = AccountFields::validate(signup.name, signup.email, signup.password)?;
        let user = fields.into_user(Role::Teacher, security);

        self.create_account(user, "User with this email already exists")
            .await
    }

    /// Verifies credentials of an active account.
    pub async fn authenticate(
        &self,
        login: &UserLoginData,
        security: &Security,
    ) -> Result<User, Problem> {
        let email = normalize_email(&login.email).ok_or_else(problem::bad_login)?;

        // TODO: throttle repeated failed logins per email
        let user = self
            .find_user_by_email(email)
            .await?
            .filter(|user| user.state.is_active())
            .ok_or_else(problem::bad_login)?;

        if !user.password.matches(&login.password, security) {
            return Err(problem::bad_login());
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::Store;
    use crate::testing;
    use rocket::http::Status;

    fn signup(email: &str) -> UserSignupData {
        UserSignupData {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
        }
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(
            normalize_email("  Alice@X.com "),
            Some("alice@x.com".to_string())
        );
        assert_eq!(normalize_email("alice"), None);
        assert_eq!(normalize_email("@x.com"), None);
    }

    #[test]
    fn account_fields_are_validated() {
        assert!(AccountFields::validate("", "a@x.com", "secret1").is_err());
        assert!(AccountFields::validate("Ada", "nope", "secret1").is_err());
        assert!(AccountFields::validate("Ada", "a@x.com", "short").is_err());

        let fields = AccountFields::validate(" Ada ", "A@X.com", "secret1").unwrap();
        assert_eq!(fields.name, "Ada");
        assert_eq!(fields.email, "a@x.com");
    }

    #[rocket::async_test]
    async fn registered_teachers_can_authenticate() {
        let store: Store = testing::store();
        let security = testing::security();

        let teacher = store
            .register_teacher(signup("T@x.com"), &security)
            .await
            .expect("unable to register teacher");
        assert_eq!(teacher.role, Role::Teacher);
        assert_eq!(teacher.email, "t@x.com");

        let login = UserLoginData {
            email: "t@x.com".to_string(),
            password: "hunter22".to_string(),
        };
        let user = store.authenticate(&login, &security).await.unwrap();
        assert_eq!(user.id, teacher.id);

        let wrong = UserLoginData {
            password: "hunter23".to_string(),
            ..login
        };
        let problem = store.authenticate(&wrong, &security).await.unwrap_err();
        assert_eq!(problem.status, Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn duplicate_emails_are_rejected() {
        let store: Store = testing::store();
        let security = testing::security();

        store
            .register_teacher(signup("t@x.com"), &security)
            .await
            .unwrap();
        let problem = store
            .register_teacher(signup("T@X.com"), &security)
            .await
            .unwrap_err();

        assert_eq!(problem.status, Status::BadRequest);
        assert_eq!(problem.message, "User with this email already exists");
    }

    #[rocket::async_test]
    async fn identities_skip_unknown_users() {
        let store: Store = testing::store();
        let security = testing::security();

        let teacher = store
            .register_teacher(signup("t@x.com"), &security)
            .await
            .unwrap();
        let identities = store
            .user_identities([teacher.id, Uuid::new_v4(), teacher.id])
            .await
            .unwrap();

        assert_eq!(identities.len(), 1);
        assert_eq!(identities[&teacher.id].email, "t@x.com");
    }
}
