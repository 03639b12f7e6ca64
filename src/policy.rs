//! Ownership and visibility rules shared by every resource manager.
//!
//! A teacher sees exactly the active records it owns. A student sees the
//! active records whose subject is one of its own subjects, whoever owns
//! them. Records without a subject (student accounts) are only ever visible
//! to their owning teacher.

use bson::{doc, Bson, Document};
use uuid::Uuid;

use crate::data::filter;
use crate::data::subject::{Subject, Subjects};
use crate::data::user::User;
use crate::data::RecordState;
use crate::resp::problem::{problems, Problem};
use crate::role::Role;

/// Authenticated actor of a request, resolved from the stored user.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Principal {
    Teacher { id: Uuid },
    Student { id: Uuid, subjects: Subjects },
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Teacher { id } | Principal::Student { id, .. } => *id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Teacher { .. } => Role::Teacher,
            Principal::Student { .. } => Role::Student,
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        match user.role {
            Role::Teacher => Principal::Teacher { id: user.id },
            Role::Student => Principal::Student {
                id: user.id,
                subjects: user.subjects.clone(),
            },
        }
    }
}

/// Access gate in front of every mutating operation and the student roster.
///
/// Yields the teacher's id, or `Forbidden` for students.
pub fn require_teacher(principal: &Principal) -> Result<Uuid, Problem> {
    match principal {
        Principal::Teacher { id } => Ok(*id),
        Principal::Student { .. } => Err(problems::forbidden()),
    }
}

/// A record with a single owning teacher and an optional subject label.
pub trait Scoped {
    fn owner(&self) -> Option<Uuid>;
    fn subject(&self) -> Option<&Subject>;
    fn state(&self) -> RecordState;
}

/// What a principal may see, independent of the resource type.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Visibility {
    OwnedBy(Uuid),
    InSubjects(Subjects),
}

impl Visibility {
    pub fn of(principal: &Principal) -> Visibility {
        match principal {
            Principal::Teacher { id } => Visibility::OwnedBy(*id),
            Principal::Student { subjects, .. } => Visibility::InSubjects(subjects.clone()),
        }
    }

    /// Whether the store query can be skipped because nothing is visible.
    pub fn is_empty(&self) -> bool {
        matches!(self, Visibility::InSubjects(subjects) if subjects.is_empty())
    }

    pub fn admits(&self, record: &impl Scoped) -> bool {
        if !record.state().is_active() {
            return false;
        }

        match self {
            Visibility::OwnedBy(id) => record.owner() == Some(*id),
            Visibility::InSubjects(subjects) => record
                .subject()
                .map_or(false, |subject| subjects.contains(subject)),
        }
    }

    /// Store filter selecting the same active records `admits` accepts.
    pub fn filter(&self, owner_field: &str) -> Document {
        let scope = match self {
            Visibility::OwnedBy(id) => {
                let mut owned = Document::new();
                owned.insert(owner_field, filter::uuid_bson(*id));
                owned
            }
            Visibility::InSubjects(subjects) => {
                let labels: Vec<Bson> = subjects
                    .iter()
                    .map(|it| Bson::String(it.to_string()))
                    .collect();
                doc! { "subject": { "$in": labels } }
            }
        };

        filter::all([scope, filter::active()])
    }
}

/// Single visibility rule used by all managers.
pub fn visible_to(principal: &Principal, record: &impl Scoped) -> bool {
    Visibility::of(principal).admits(record)
}

/// Lookup filter for a record the teacher may mutate. Missing, foreign and
/// deleted records all look the same to the caller.
pub fn owned_by(teacher: Uuid, owner_field: &str, id: Uuid) -> Document {
    filter::all([
        filter::by_id(id),
        Visibility::OwnedBy(teacher).filter(owner_field),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::subject::subjects_from;

    struct Item {
        owner: Uuid,
        subject: Option<Subject>,
        state: RecordState,
    }

    impl Scoped for Item {
        fn owner(&self) -> Option<Uuid> {
            Some(self.owner)
        }

        fn subject(&self) -> Option<&Subject> {
            self.subject.as_ref()
        }

        fn state(&self) -> RecordState {
            self.state
        }
    }

    fn item(owner: Uuid, subject: &str) -> Item {
        Item {
            owner,
            subject: Subject::parse(subject),
            state: RecordState::Active,
        }
    }

    fn student(subjects: &[&str]) -> Principal {
        Principal::Student {
            id: Uuid::new_v4(),
            subjects: subjects_from(subjects.iter()),
        }
    }

    #[test]
    fn teachers_see_only_their_own_records() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let teacher_a = Principal::Teacher { id: a };

        assert!(visible_to(&teacher_a, &item(a, "math")));
        assert!(!visible_to(&teacher_a, &item(b, "math")));
    }

    #[test]
    fn students_see_their_subjects_across_owners() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let math = student(&["math"]);

        assert!(visible_to(&math, &item(a, "math")));
        assert!(visible_to(&math, &item(b, "math")));
        assert!(!visible_to(&math, &item(a, "physics")));
        assert!(!visible_to(&student(&[]), &item(a, "math")));
    }

    #[test]
    fn subjectless_records_are_hidden_from_students() {
        let owner = Uuid::new_v4();
        let account = Item {
            owner,
            subject: None,
            state: RecordState::Active,
        };

        assert!(!visible_to(&student(&["math"]), &account));
        assert!(visible_to(&Principal::Teacher { id: owner }, &account));
    }

    #[test]
    fn deleted_records_are_never_visible() {
        let owner = Uuid::new_v4();
        let mut deleted = item(owner, "math");
        deleted.state = RecordState::Deleted;

        assert!(!visible_to(&Principal::Teacher { id: owner }, &deleted));
        assert!(!visible_to(&student(&["math"]), &deleted));
    }

    #[test]
    fn only_teachers_pass_the_gate() {
        let id = Uuid::new_v4();
        assert_eq!(require_teacher(&Principal::Teacher { id }), Ok(id));

        let problem = require_teacher(&student(&["math"])).unwrap_err();
        assert_eq!(problem.status, rocket::http::Status::Forbidden);
    }

    #[test]
    fn filters_mirror_visibility() {
        let id = Uuid::new_v4();
        let owned = Visibility::OwnedBy(id).filter("uploadedBy");
        assert_eq!(owned.get("uploadedBy"), Some(&filter::uuid_bson(id)));
        assert!(owned.get_bool("isActive").unwrap());

        let subjects = Visibility::InSubjects(subjects_from(["math"])).filter("uploadedBy");
        assert_eq!(
            subjects.get_document("subject").unwrap(),
            &doc! { "$in": ["math"] }
        );
        assert!(subjects.get("uploadedBy").is_none());
    }
}
