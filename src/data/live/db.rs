use bson::doc;
use uuid::Uuid;

use super::{LiveSession, LiveSessionCreateData, LiveSessionResponse};
use crate::data::store::Store;
use crate::data::subject::Subject;
use crate::data::{stored_now, stored_time, RecordState};
use crate::policy::{self, require_teacher, visible_to, Principal, Visibility};
use crate::resp::problem::{problems, Problem};
use crate::util::non_blank;

pub const OWNER_FIELD: &str = "createdBy";

pub mod problem {
    use crate::resp::problem::{problems, Problem};

    #[inline]
    pub fn not_found() -> Problem {
        problems::not_found("Live session not found")
    }
}

pub struct LiveSessionManager<'a> {
    store: &'a Store,
}

impl<'a> LiveSessionManager<'a> {
    pub fn new(store: &'a Store) -> LiveSessionManager<'a> {
        LiveSessionManager { store }
    }

    /// Visible sessions ordered by `scheduledAt`, past ones included.
    pub async fn list(
        &self,
        principal: &Principal,
    ) -> Result<Vec<LiveSessionResponse>, Problem> {
        let visibility = Visibility::of(principal);
        if visibility.is_empty() {
            return Ok(vec![]);
        }

        let sessions: Vec<LiveSession> = self
            .store
            .find_records(
                visibility.filter(OWNER_FIELD),
                Some(doc! { "scheduledAt": 1 }),
            )
            .await?;
        let mut sessions: Vec<LiveSession> = sessions
            .into_iter()
            .filter(|session| visible_to(principal, session))
            .collect();
        sessions.sort_by_key(|session| session.scheduled_at);

        let hosts = self
            .store
            .user_identities(sessions.iter().map(|session| session.created_by))
            .await?;

        Ok(sessions
            .into_iter()
            .map(|session| {
                let host = hosts.get(&session.created_by).cloned();
                LiveSessionResponse::new(session, host)
            })
            .collect())
    }

    pub async fn create(
        &self,
        principal: &Principal,
        data: LiveSessionCreateData,
    ) -> Result<LiveSessionResponse, Problem> {
        let teacher = require_teacher(principal)?;

        let title = non_blank(data.title).ok_or_else(|| problems::missing_field("title"))?;
        let meet_link =
            non_blank(data.meet_link).ok_or_else(|| problems::missing_field("meetLink"))?;
        let subject =
            Subject::parse(data.subject).ok_or_else(|| problems::missing_field("subject"))?;

        let now = stored_now();
        let session = LiveSession {
            id: Uuid::new_v4(),
            title,
            meet_link,
            subject,
            scheduled_at: stored_time(data.scheduled_at),
            description: data.description.unwrap_or_default(),
            created_by: teacher,
            state: RecordState::Active,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_record(&session).await?;
        tracing::info!(
            "teacher {} scheduled live session {} at {}",
            teacher,
            session.id,
            session.scheduled_at
        );

        let host = self.store.user_identities([teacher]).await?.remove(&teacher);
        Ok(LiveSessionResponse::new(session, host))
    }

    pub async fn remove(&self, principal: &Principal, id: Uuid) -> Result<(), Problem> {
        let teacher = require_teacher(principal)?;

        let mut session = self
            .store
            .find_record::<LiveSession>(policy::owned_by(teacher, OWNER_FIELD, id))
            .await?
            .filter(|session| visible_to(principal, session))
            .ok_or_else(problem::not_found)?;

        session.state = RecordState::Deleted;
        session.updated_at = stored_now();

        if !self.store.save_record(&session).await? {
            return Err(problem::not_found());
        }

        tracing::info!("teacher {} deleted live session {}", teacher, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use chrono::{DateTime, Duration, Utc};

    fn session(subject: &str, scheduled_at: DateTime<Utc>) -> LiveSessionCreateData {
        LiveSessionCreateData {
            title: "Algebra Q&A".to_string(),
            meet_link: "https://meet.example/abc".to_string(),
            subject: subject.to_string(),
            scheduled_at,
            description: Some("Bring questions".to_string()),
        }
    }

    #[rocket::async_test]
    async fn sessions_are_ordered_by_schedule() {
        let store = testing::store();
        let teacher = testing::teacher(&store, "a@x.com").await;
        let manager = LiveSessionManager::new(&store);
        let now = Utc::now();

        let later = manager
            .create(&teacher, session("math", now + Duration::days(1)))
            .await
            .unwrap();
        let earlier = manager
            .create(&teacher, session("math", now - Duration::days(1)))
            .await
            .unwrap();

        let listed: Vec<Uuid> = manager
            .list(&teacher)
            .await
            .unwrap()
            .into_iter()
            .map(|it| it.id)
            .collect();
        assert_eq!(listed, vec![earlier.id, later.id]);

        // past sessions stay visible to students
        let student = testing::student_principal(&["math"]);
        let listed: Vec<Uuid> = manager
            .list(&student)
            .await
            .unwrap()
            .into_iter()
            .map(|it| it.id)
            .collect();
        assert_eq!(listed, vec![earlier.id, later.id]);
    }

    #[rocket::async_test]
    async fn hosts_are_joined_into_responses() {
        let store = testing::store();
        let teacher = testing::teacher(&store, "a@x.com").await;
        let manager = LiveSessionManager::new(&store);

        let created = manager
            .create(&teacher, session("math", Utc::now()))
            .await
            .unwrap();
        let host = created.created_by.unwrap();
        assert_eq!(host.id, teacher.id());
        assert_eq!(host.email, "a@x.com");
        assert_eq!(created.description, "Bring questions");
    }

    #[rocket::async_test]
    async fn students_only_see_their_subjects() {
        let store = testing::store();
        let teacher = testing::teacher(&store, "a@x.com").await;
        let manager = LiveSessionManager::new(&store);

        manager
            .create(&teacher, session("math", Utc::now()))
            .await
            .unwrap();

        assert_eq!(
            manager
                .list(&testing::student_principal(&["math", "bio"]))
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(manager
            .list(&testing::student_principal(&["physics"]))
            .await
            .unwrap()
            .is_empty());
    }

    #[rocket::async_test]
    async fn deleted_sessions_disappear() {
        let store = testing::store();
        let a = testing::teacher(&store, "a@x.com").await;
        let b = testing::teacher(&store, "b@x.com").await;
        let manager = LiveSessionManager::new(&store);

        let created = manager
            .create(&a, session("math", Utc::now()))
            .await
            .unwrap();

        assert_eq!(
            manager.remove(&b, created.id).await.unwrap_err(),
            problem::not_found()
        );
        manager.remove(&a, created.id).await.unwrap();

        assert!(manager.list(&a).await.unwrap().is_empty());
        assert_eq!(
            manager.remove(&a, created.id).await.unwrap_err(),
            problem::not_found()
        );
    }

    #[rocket::async_test]
    async fn created_sessions_match_what_is_listed() {
        let store = testing::store();
        let teacher = testing::teacher(&store, "a@x.com").await;
        let manager = LiveSessionManager::new(&store);

        let created = manager
            .create(&teacher, session("math", Utc::now() + Duration::hours(2)))
            .await
            .unwrap();
        let listed = manager.list(&teacher).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].scheduled_at, created.scheduled_at);
        assert_eq!(listed[0].created_at, created.created_at);
        assert_eq!(listed[0].updated_at, created.updated_at);
        assert_eq!(created.scheduled_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
