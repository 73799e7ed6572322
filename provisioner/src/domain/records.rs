//! Row shapes handed to the persistence sink and the course materializer.
//!
//! Rows are built from roster records at the moment they are persisted, so a
//! row always reflects the state the orchestrator had reached at that stage.

use chrono::{DateTime, Local};
use sample_roster::{AccessLevel, Course, CourseGroup, Term, User, UserDirectory};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Timestamp layout of the `last_updated` column.
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// Errors raised while building rows from roster records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A course member has no enrollment entry for the course.
    #[error("member '{user_id}' of course '{code}' has no enrollment")]
    MissingEnrollment {
        /// Course code.
        code: String,
        /// Member without an enrollment.
        user_id: String,
    },
}

/// Digests a credential secret for storage.
///
/// The digest covers `<user_id>:<secret>` so identical secrets on different
/// accounts never produce identical rows.
///
/// # Example
///
/// ```
/// use roster_provisioner::domain::hash_credential;
///
/// let digest = hash_credential("instructor", "instructor");
/// assert_eq!(digest.len(), 64);
/// assert_ne!(digest, hash_credential("ta", "instructor"));
/// ```
#[must_use]
pub fn hash_credential(user_id: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Formats a timestamp for the `last_updated` column.
#[must_use]
pub fn format_last_updated(now: DateTime<Local>) -> String {
    now.format(LAST_UPDATED_FORMAT).to_string()
}

/// A persisted user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    /// User id.
    pub user_id: String,
    /// Numeric id.
    pub numeric_id: u32,
    /// Hex SHA-256 digest of the credential.
    pub password_hash: String,
    /// Legal given name.
    pub given_name: String,
    /// Preferred given name.
    pub preferred_given_name: Option<String>,
    /// Legal family name.
    pub family_name: String,
    /// Preferred family name.
    pub preferred_family_name: Option<String>,
    /// Email address.
    pub email: String,
    /// Platform access level.
    pub access_level: AccessLevel,
    /// Pronouns, empty when unset.
    pub pronouns: String,
    /// Row timestamp in [`LAST_UPDATED_FORMAT`].
    pub last_updated: String,
}

impl UserRow {
    /// Builds the row for `user`, digesting its credential.
    #[must_use]
    pub fn from_user(user: &User, last_updated: &str) -> Self {
        Self {
            user_id: user.user_id.clone(),
            numeric_id: user.numeric_id,
            password_hash: hash_credential(&user.user_id, &user.password),
            given_name: user.given_name.clone(),
            preferred_given_name: user.preferred_given_name.clone(),
            family_name: user.family_name.clone(),
            preferred_family_name: user.preferred_family_name.clone(),
            email: user.email.clone(),
            access_level: user.access_level,
            pronouns: user.pronouns.clone(),
            last_updated: last_updated.to_owned(),
        }
    }
}

/// A persisted term row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermRow {
    /// Short term id, for example `s24`.
    pub term_id: String,
    /// Display name, for example `Spring 2024`.
    pub name: String,
    /// Start date as `MM/DD/YYYY`.
    pub start_date: String,
    /// End date as `MM/DD/YYYY`.
    pub end_date: String,
}

impl From<&Term> for TermRow {
    fn from(term: &Term) -> Self {
        Self {
            term_id: term.id().to_owned(),
            name: term.name().to_owned(),
            start_date: term.start_display(),
            end_date: term.end_display(),
        }
    }
}

/// One course membership row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipRow {
    /// Member id.
    pub user_id: String,
    /// Role within the course.
    pub group: CourseGroup,
    /// Registration section, if any.
    pub registration_section: Option<u32>,
    /// Rotating section, if any.
    pub rotating_section: Option<u32>,
}

/// A persisted course with its membership sorted by user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRecord {
    /// Term the course is provisioned into.
    pub term_id: String,
    /// Course code.
    pub code: String,
    /// Instructor id.
    pub instructor_id: String,
    /// Number of registration sections.
    pub registration_sections: u32,
    /// Number of rotating sections.
    pub rotating_sections: u32,
    /// Membership rows in user id order.
    pub members: Vec<MembershipRow>,
}

impl CourseRecord {
    /// Builds the record for an allocated course.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MissingEnrollment`] if a member cannot be
    /// resolved to an enrollment for the course.
    pub fn build(
        term: &Term,
        course: &Course,
        directory: &UserDirectory,
    ) -> Result<Self, RecordError> {
        let members = course
            .sorted_members()
            .into_iter()
            .map(|user_id| {
                let Some(enrollment) = directory
                    .get(&user_id)
                    .and_then(|user| user.enrollment(course.code()))
                else {
                    return Err(RecordError::MissingEnrollment {
                        code: course.code().to_owned(),
                        user_id,
                    });
                };
                Ok(MembershipRow {
                    group: enrollment.group,
                    registration_section: enrollment.sections.registration_section,
                    rotating_section: enrollment.sections.rotating_section,
                    user_id,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            term_id: term.id().to_owned(),
            code: course.code().to_owned(),
            instructor_id: course.instructor_id().to_owned(),
            registration_sections: course.sections().registration,
            rotating_sections: course.sections().rotating,
            members,
        })
    }

    /// Returns the ids of members enrolled as students.
    pub fn student_ids(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|member| member.group == CourseGroup::Student)
            .map(|member| member.user_id.as_str())
    }
}
