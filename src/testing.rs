//! Fixtures shared by unit and endpoint tests.

use std::sync::Arc;

use rocket::http::Header;
use rocket::local::asynchronous::Client;
use uuid::Uuid;

use crate::config::Config;
use crate::data::store::{MemoryStore, Store};
use crate::data::subject::subjects_from;
use crate::data::user::db::AccountFields;
use crate::data::user::User;
use crate::policy::Principal;
use crate::resp::jwt::UserRoleToken;
use crate::role::Role;
use crate::security::{KeySet, Security};

pub fn security() -> Security {
    Security::new(
        [7; 16],
        4,
        KeySet {
            public: include_bytes!("../fixtures/jwt_test.pem.pub").to_vec(),
            private: include_bytes!("../fixtures/jwt_test.pem").to_vec(),
        },
    )
}

pub fn store() -> Store {
    Arc::new(MemoryStore::new())
}

pub fn teacher_principal() -> Principal {
    Principal::Teacher { id: Uuid::new_v4() }
}

pub fn student_principal(subjects: &[&str]) -> Principal {
    Principal::Student {
        id: Uuid::new_v4(),
        subjects: subjects_from(subjects),
    }
}

/// Stores a user account directly, bypassing the endpoints.
pub async fn seed_user(
    store: &Store,
    email: &str,
    role: Role,
    subjects: &[&str],
    created_by: Option<Uuid>,
) -> User {
    let mut user = AccountFields::validate("Test User", email, "secret1")
        .expect("valid account fields")
        .into_user(role, &security());
    user.subjects = subjects_from(subjects);
    user.created_by = created_by;

    store.insert_record(&user).await.expect("unable to seed user");
    user
}

/// Registered teacher with the given email.
pub async fn teacher(store: &Store, email: &str) -> Principal {
    let user = seed_user(store, email, Role::Teacher, &[], None).await;
    Principal::from(&user)
}

pub fn bearer(user: &User) -> Header<'static> {
    let token = UserRoleToken::new(user, chrono::Duration::hours(1))
        .encode_jwt(&security().jwt_keys.private)
        .expect("unable to sign test token");
    Header::new("Authorization", format!("Bearer {}", token))
}

/// Local client over an in-memory store, returned with a handle to that store.
pub async fn client() -> (Client, Store) {
    let store = store();
    let rocket = crate::build(Config::default(), store.clone(), security())
        .expect("invalid backend");
    let client = Client::tracked(rocket)
        .await
        .expect("invalid rocket instance");

    (client, store)
}
