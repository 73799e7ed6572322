//! User records and per-course enrollment attributes.
//!
//! Users are fixed-shape records: every field is explicit and the optional
//! section fields are plain `Option`s, validated once when definitions load
//! or when the planner writes them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{DefinitionError, PlanningError};

/// Platform-wide access level of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Full administrative access.
    Superuser,
    /// May create and administer courses.
    Faculty,
    /// Regular account.
    #[default]
    User,
}

impl AccessLevel {
    /// Returns the numeric code stored by the platform.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Superuser => 1,
            Self::Faculty => 2,
            Self::User => 3,
        }
    }
}

/// Role a user holds inside one course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseGroup {
    /// Course instructor.
    Instructor,
    /// Grader with access to every section.
    FullAccessGrader,
    /// Grader restricted to assigned sections.
    LimitedAccessGrader,
    /// Enrolled student.
    #[default]
    Student,
}

impl CourseGroup {
    /// Returns the numeric code stored by the platform.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Instructor => 1,
            Self::FullAccessGrader => 2,
            Self::LimitedAccessGrader => 3,
            Self::Student => 4,
        }
    }
}

/// Registration and rotating section pair for one (user, course) pair.
///
/// Section indices are 1-based; `None` means the user has no section of
/// that kind in the course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionAssignment {
    /// Official enrollment section.
    pub registration_section: Option<u32>,
    /// Secondary rotating section.
    pub rotating_section: Option<u32>,
}

impl SectionAssignment {
    /// Creates an assignment from explicit section values.
    #[must_use]
    pub const fn new(registration_section: Option<u32>, rotating_section: Option<u32>) -> Self {
        Self {
            registration_section,
            rotating_section,
        }
    }

    /// Assignment with neither section set.
    #[must_use]
    pub const fn unassigned() -> Self {
        Self::new(None, None)
    }
}

/// A user's membership attributes within one course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Role within the course.
    pub group: CourseGroup,
    /// Section pair within the course.
    pub sections: SectionAssignment,
}

impl Enrollment {
    /// Creates a student enrollment with the given sections.
    #[must_use]
    pub const fn student(sections: SectionAssignment) -> Self {
        Self {
            group: CourseGroup::Student,
            sections,
        }
    }
}

/// An account known to the provisioning run, real or synthetic.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
///
/// use sample_roster::{AccessLevel, User};
///
/// let user = User {
///     user_id: "instructor".to_owned(),
///     numeric_id: 801_516_157,
///     given_name: "Quinn".to_owned(),
///     preferred_given_name: None,
///     family_name: "Instructor".to_owned(),
///     preferred_family_name: None,
///     email: "instructor@example.com".to_owned(),
///     password: "instructor".to_owned(),
///     access_level: AccessLevel::Faculty,
///     pronouns: String::new(),
///     courses: BTreeMap::new(),
/// };
///
/// assert!(user.enrollment("sample").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique account identifier.
    pub user_id: String,
    /// Numeric identifier, such as a student number.
    pub numeric_id: u32,
    /// Legal given name.
    pub given_name: String,
    /// Preferred given name, if different.
    pub preferred_given_name: Option<String>,
    /// Legal family name.
    pub family_name: String,
    /// Preferred family name, if different.
    pub preferred_family_name: Option<String>,
    /// Contact email address.
    pub email: String,
    /// Plaintext credential; only ever persisted in hashed form.
    pub password: String,
    /// Platform-wide access level.
    pub access_level: AccessLevel,
    /// Free-form pronouns, empty when unspecified.
    pub pronouns: String,
    /// Enrollment attributes keyed by course code.
    pub courses: BTreeMap<String, Enrollment>,
}

impl User {
    /// Returns the enrollment for a course, if any.
    #[must_use]
    pub fn enrollment(&self, code: &str) -> Option<&Enrollment> {
        self.courses.get(code)
    }

    /// Records an enrollment for a course.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::DuplicateAssignment`] if the user already holds
    /// an enrollment for the course; each entry is written exactly once.
    pub fn enroll(&mut self, code: &str, enrollment: Enrollment) -> Result<(), PlanningError> {
        if self.courses.contains_key(code) {
            return Err(PlanningError::DuplicateAssignment {
                code: code.to_owned(),
                user_id: self.user_id.clone(),
            });
        }
        self.courses.insert(code.to_owned(), enrollment);
        Ok(())
    }
}

/// All users of a run, keyed and iterated in user-id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    users: BTreeMap<String, User>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            users: BTreeMap::new(),
        }
    }

    /// Adds a user.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateUser`] if the id is already present.
    pub fn insert(&mut self, user: User) -> Result<(), DefinitionError> {
        if self.users.contains_key(&user.user_id) {
            return Err(DefinitionError::DuplicateUser {
                user_id: user.user_id,
            });
        }
        self.users.insert(user.user_id.clone(), user);
        Ok(())
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    /// Looks up a user by id for mutation.
    pub fn get_mut(&mut self, user_id: &str) -> Option<&mut User> {
        self.users.get_mut(user_id)
    }

    /// Returns `true` if the id is present.
    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    /// Returns every id in the directory.
    #[must_use]
    pub fn ids(&self) -> BTreeSet<String> {
        self.users.keys().cloned().collect()
    }

    /// Iterates users in id order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Returns the number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` when the directory holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<User> for UserDirectory {
    /// Collects users into a directory; a later user replaces an earlier one
    /// with the same id.
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        Self {
            users: iter
                .into_iter()
                .map(|user| (user.user_id.clone(), user))
                .collect(),
        }
    }
}

impl Extend<User> for UserDirectory {
    fn extend<I: IntoIterator<Item = User>>(&mut self, iter: I) {
        self.users
            .extend(iter.into_iter().map(|user| (user.user_id.clone(), user)));
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn student() -> User {
        User {
            user_id: "student".to_owned(),
            numeric_id: 410_853_871,
            given_name: "Joe".to_owned(),
            preferred_given_name: None,
            family_name: "Student".to_owned(),
            preferred_family_name: None,
            email: "student@example.com".to_owned(),
            password: "student".to_owned(),
            access_level: AccessLevel::User,
            pronouns: String::new(),
            courses: BTreeMap::new(),
        }
    }

    #[rstest]
    fn enroll_writes_entry_once(mut student: User) {
        let sections = SectionAssignment::new(Some(1), Some(2));
        student
            .enroll("sample", Enrollment::student(sections))
            .expect("first enrollment succeeds");

        let second = student.enroll("sample", Enrollment::student(SectionAssignment::unassigned()));

        assert_eq!(
            second,
            Err(PlanningError::DuplicateAssignment {
                code: "sample".to_owned(),
                user_id: "student".to_owned(),
            })
        );
        assert_eq!(
            student.enrollment("sample").map(|e| e.sections),
            Some(sections)
        );
    }

    #[rstest]
    fn directory_rejects_duplicate_ids(student: User) {
        let mut directory = UserDirectory::new();
        directory.insert(student.clone()).expect("first insert");

        let result = directory.insert(student);

        assert_eq!(
            result,
            Err(DefinitionError::DuplicateUser {
                user_id: "student".to_owned()
            })
        );
        assert_eq!(directory.len(), 1);
    }

    #[rstest]
    fn directory_iterates_in_id_order(student: User) {
        let mut directory = UserDirectory::new();
        let mut other = student.clone();
        other.user_id = "aphacker".to_owned();
        directory.insert(student).expect("insert student");
        directory.insert(other).expect("insert other");

        let ids: Vec<_> = directory.iter().map(|u| u.user_id.as_str()).collect();

        assert_eq!(ids, ["aphacker", "student"]);
    }

    #[test]
    fn codes_match_platform_values() {
        assert_eq!(AccessLevel::Faculty.code(), 2);
        assert_eq!(CourseGroup::Instructor.code(), 1);
        assert_eq!(CourseGroup::Student.code(), 4);
    }

    #[test]
    fn course_group_serializes_snake_case() {
        let json = serde_json::to_string(&CourseGroup::FullAccessGrader).expect("serialize");
        assert_eq!(json, "\"full_access_grader\"");
    }
}
