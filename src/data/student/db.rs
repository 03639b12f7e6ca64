use bson::doc;
use uuid::Uuid;

use super::{StudentCreateData, StudentResponse, SubjectsUpdateData};
use crate::data::filter;
use crate::data::store::Store;
use crate::data::subject::subjects_from;
use crate::data::user::db::AccountFields;
use crate::data::user::User;
use crate::data::RecordState;
use crate::policy::{self, require_teacher, visible_to, Principal, Visibility};
use crate::resp::problem::Problem;
use crate::role::Role;
use crate::security::Security;

/// Field linking a student to the teacher that created it.
pub const OWNER_FIELD: &str = "createdBy";

pub mod problem {
    use crate::resp::problem::{problems, Problem};

    #[inline]
    pub fn not_found() -> Problem {
        problems::not_found("Student not found")
    }

    pub const EMAIL_TAKEN: &str = "Student with this email already exists";
}

fn students_only() -> bson::Document {
    doc! { "role": Role::Student.to_string() }
}

/// Teacher-owned student roster.
pub struct StudentManager<'a> {
    store: &'a Store,
    security: &'a Security,
}

impl<'a> StudentManager<'a> {
    pub fn new(store: &'a Store, security: &'a Security) -> StudentManager<'a> {
        StudentManager { store, security }
    }

    /// Active students created by the calling teacher.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<StudentResponse>, Problem> {
        let teacher = require_teacher(principal)?;

        let students: Vec<User> = self
            .store
            .find_records(
                filter::all([Visibility::OwnedBy(teacher).filter(OWNER_FIELD), students_only()]),
                Some(doc! { "createdAt": 1 }),
            )
            .await?;

        Ok(students
            .into_iter()
            .filter(|student| visible_to(principal, student))
            .map(StudentResponse::from)
            .collect())
    }

    pub async fn create(
        &self,
        principal: &Principal,
        data: StudentCreateData,
    ) -> Result<StudentResponse, Problem> {
        let teacher = require_teacher(principal)?;
        let fields = AccountFields::validate(data.name, data.email, data.password)?;

        let mut student = fields.into_user(Role::Student, self.security);
        student.subjects = subjects_from(data.subjects.unwrap_or_default());
        student.created_by = Some(teacher);

        let student = self
            .store
            .create_account(student, problem::EMAIL_TAKEN)
            .await?;
        tracing::info!("teacher {} created student {}", teacher, student.id);

        Ok(student.into())
    }

    /// Replaces the student's subjects wholesale.
    pub async fn update_subjects(
        &self,
        principal: &Principal,
        id: Uuid,
        data: SubjectsUpdateData,
    ) -> Result<StudentResponse, Problem> {
        let mut student = self.find_owned(principal, id).await?;

        student.subjects = subjects_from(data.subjects.unwrap_or_default());
        student.touch();
        self.save(&student).await?;

        Ok(student.into())
    }

    /// Soft-deletes the student.
    pub async fn remove(&self, principal: &Principal, id: Uuid) -> Result<(), Problem> {
        let mut student = self.find_owned(principal, id).await?;

        student.state = RecordState::Deleted;
        student.touch();
        self.save(&student).await?;

        tracing::info!("teacher {} deleted student {}", principal.id(), id);
        Ok(())
    }

    async fn find_owned(&self, principal: &Principal, id: Uuid) -> Result<User, Problem> {
        let teacher = require_teacher(principal)?;

        self.store
            .find_record::<User>(filter::all([
                policy::owned_by(teacher, OWNER_FIELD, id),
                students_only(),
            ]))
            .await?
            .filter(|student| visible_to(principal, student))
            .ok_or_else(problem::not_found)
    }

    async fn save(&self, student: &User) -> Result<(), Problem> {
        if self.store.save_record(student).await? {
            Ok(())
        } else {
            Err(problem::not_found())
        }
    }
}
