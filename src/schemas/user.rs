use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::security::Role;
use crate::db::models::{Student, Teacher};
use crate::schemas::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AccountCreate {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub(crate) name: String,
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 120, message = "email must be at most 120 characters")
    )]
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountLogin {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AccountResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) role: Role,
    pub(crate) created_at: String,
}

impl AccountResponse {
    pub(crate) fn from_teacher(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id.clone(),
            name: teacher.name.clone(),
            email: teacher.email.clone(),
            role: Role::Teacher,
            created_at: format_primitive(teacher.created_at),
        }
    }

    pub(crate) fn from_student(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
            role: Role::Student,
            created_at: format_primitive(student.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self { id: student.id.clone(), name: student.name.clone(), email: student.email.clone() }
    }
}
