//! Course and user definitions and their YAML representation.
//!
//! Definitions are parsed from YAML documents and validated once, up front,
//! so that later stages work with fixed-shape records instead of ad hoc
//! lookups. Unknown keys are ignored; course documents commonly carry
//! gradeable descriptions that this crate does not consume.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::course::{Course, PopulationQuotas, SectionCounts, SectionKind};
use crate::error::DefinitionError;
use crate::user::{AccessLevel, CourseGroup, Enrollment, SectionAssignment, User, UserDirectory};
use crate::validation::{is_valid_course_code, is_valid_user_id};

/// Email domain used when a user definition omits an address.
const DEFAULT_EMAIL_DOMAIN: &str = "example.com";

/// A validated course definition.
///
/// # Example
///
/// ```
/// use sample_roster::CourseDefinition;
///
/// let yaml = "
/// code: sample
/// instructor: instructor
/// registration_sections: 2
/// rotating_sections: 3
/// registered_students: 2
/// unregistered_students: 1
/// ";
///
/// let course = CourseDefinition::from_yaml("sample.yml", yaml).expect("valid course");
/// assert_eq!(course.code(), "sample");
/// assert_eq!(course.quotas().total(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDefinition {
    code: String,
    instructor_id: String,
    quotas: PopulationQuotas,
    sections: SectionCounts,
    regenerate_config: bool,
}

impl CourseDefinition {
    /// Parses and validates a course definition from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the document is malformed, the code is
    /// invalid, or either section count is zero.
    pub fn from_yaml(source_name: &str, yaml: &str) -> Result<Self, DefinitionError> {
        let raw: RawCourseDefinition =
            serde_yaml::from_str(yaml).map_err(|e| DefinitionError::ParseError {
                source_name: source_name.to_owned(),
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCourseDefinition) -> Result<Self, DefinitionError> {
        if !is_valid_course_code(&raw.code) {
            return Err(DefinitionError::InvalidCourseCode { code: raw.code });
        }
        for (kind, count) in [
            (SectionKind::Registration, raw.registration_sections),
            (SectionKind::Rotating, raw.rotating_sections),
        ] {
            if count == 0 {
                return Err(DefinitionError::ZeroSectionCount {
                    code: raw.code,
                    kind,
                });
            }
        }

        Ok(Self {
            code: raw.code,
            instructor_id: raw.instructor,
            quotas: PopulationQuotas {
                registered: raw.registered_students,
                unregistered: raw.unregistered_students,
                no_rotating: raw.no_rotating_students,
                no_registration: raw.no_registration_students,
            },
            sections: SectionCounts {
                registration: raw.registration_sections,
                rotating: raw.rotating_sections,
            },
            regenerate_config: raw.regenerate_config,
        })
    }

    /// Returns the course code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the instructor's user id.
    #[must_use]
    pub fn instructor_id(&self) -> &str {
        &self.instructor_id
    }

    /// Returns the population quotas.
    #[must_use]
    pub const fn quotas(&self) -> PopulationQuotas {
        self.quotas
    }

    /// Returns the section counts.
    #[must_use]
    pub const fn sections(&self) -> SectionCounts {
        self.sections
    }

    /// Builds the run-time course record with an empty membership list.
    #[must_use]
    pub fn to_course(&self) -> Course {
        Course::new(
            self.code.clone(),
            self.instructor_id.clone(),
            self.quotas,
            self.sections,
        )
        .with_regenerate_config(self.regenerate_config)
    }
}

/// A validated user definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDefinition {
    user: User,
    lists_courses: bool,
}

impl UserDefinition {
    /// Parses and validates a user definition from YAML.
    ///
    /// Omitted fields fall back to platform conventions: the email is
    /// `<id>@example.com`, the password equals the id, and the access level
    /// is `user`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if the document is malformed or the id is
    /// invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use sample_roster::{AccessLevel, UserDefinition};
    ///
    /// let yaml = "
    /// user_id: instructor
    /// numeric_id: 801516157
    /// given_name: Quinn
    /// family_name: Instructor
    /// access_level: faculty
    /// courses:
    ///   sample:
    ///     group: instructor
    ///     registration_section: 1
    /// ";
    ///
    /// let definition = UserDefinition::from_yaml("instructor.yml", yaml).expect("valid user");
    /// assert_eq!(definition.user().access_level, AccessLevel::Faculty);
    /// assert_eq!(definition.user().email, "instructor@example.com");
    /// ```
    pub fn from_yaml(source_name: &str, yaml: &str) -> Result<Self, DefinitionError> {
        let raw: RawUserDefinition =
            serde_yaml::from_str(yaml).map_err(|e| DefinitionError::ParseError {
                source_name: source_name.to_owned(),
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawUserDefinition) -> Result<Self, DefinitionError> {
        if !is_valid_user_id(&raw.user_id) {
            return Err(DefinitionError::InvalidUserId {
                user_id: raw.user_id,
            });
        }

        let lists_courses = raw.courses.is_some();
        let courses = raw
            .courses
            .unwrap_or_default()
            .into_iter()
            .map(|(code, enrollment)| {
                let sections = SectionAssignment::new(
                    enrollment.registration_section,
                    enrollment.rotating_section,
                );
                (
                    code,
                    Enrollment {
                        group: enrollment.group,
                        sections,
                    },
                )
            })
            .collect();

        let email = raw
            .email
            .unwrap_or_else(|| format!("{}@{DEFAULT_EMAIL_DOMAIN}", raw.user_id));
        let password = raw.password.unwrap_or_else(|| raw.user_id.clone());

        Ok(Self {
            user: User {
                user_id: raw.user_id,
                numeric_id: raw.numeric_id,
                given_name: raw.given_name,
                preferred_given_name: raw.preferred_given_name,
                family_name: raw.family_name,
                preferred_family_name: raw.preferred_family_name,
                email,
                password,
                access_level: raw.access_level,
                pronouns: raw.pronouns.unwrap_or_default(),
                courses,
            },
            lists_courses,
        })
    }

    /// Returns the user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }

    /// Returns the user record described by the definition.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Reports whether the definition carries a `courses` key.
    #[must_use]
    pub const fn lists_courses(&self) -> bool {
        self.lists_courses
    }

    /// Returns the user enrolled for a run over `offered` course codes.
    ///
    /// A definition without a `courses` key joins every offered course as a
    /// student with no sections. An explicit (even empty) `courses` map is
    /// used as declared.
    ///
    /// # Example
    ///
    /// ```
    /// use sample_roster::{CourseGroup, UserDefinition};
    ///
    /// let yaml = "user_id: admin\nnumeric_id: 1\ngiven_name: Ada\nfamily_name: Admin\n";
    /// let definition = UserDefinition::from_yaml("admin.yml", yaml).expect("valid user");
    ///
    /// let user = definition.enrolled_user(["sample", "tutorial"]);
    /// assert_eq!(user.courses.len(), 2);
    /// assert_eq!(
    ///     user.enrollment("tutorial").map(|e| e.group),
    ///     Some(CourseGroup::Student)
    /// );
    /// ```
    #[must_use]
    pub fn enrolled_user<'a>(&self, offered: impl IntoIterator<Item = &'a str>) -> User {
        let mut user = self.user.clone();
        if !self.lists_courses {
            user.courses.extend(offered.into_iter().map(|code| {
                (
                    code.to_owned(),
                    Enrollment::student(SectionAssignment::unassigned()),
                )
            }));
        }
        user
    }
}

/// The complete, cross-validated set of course and user definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definitions {
    courses: BTreeMap<String, CourseDefinition>,
    users: BTreeMap<String, UserDefinition>,
}

impl Definitions {
    /// Combines course and user definitions, checking references between them.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] if a course code or user id is repeated, if
    /// a user is enrolled in an undefined course, or if a declared section
    /// index falls outside the course's section range.
    pub fn new(
        courses: Vec<CourseDefinition>,
        users: Vec<UserDefinition>,
    ) -> Result<Self, DefinitionError> {
        let mut course_map = BTreeMap::new();
        for course in courses {
            if course_map.contains_key(course.code()) {
                return Err(DefinitionError::DuplicateCourse { code: course.code });
            }
            course_map.insert(course.code.clone(), course);
        }

        let mut user_map = BTreeMap::new();
        for definition in users {
            if user_map.contains_key(definition.user_id()) {
                return Err(DefinitionError::DuplicateUser {
                    user_id: definition.user.user_id,
                });
            }
            validate_enrollments(definition.user(), &course_map)?;
            user_map.insert(definition.user.user_id.clone(), definition);
        }

        Ok(Self {
            courses: course_map,
            users: user_map,
        })
    }

    /// Returns course definitions in code order.
    pub fn courses(&self) -> impl Iterator<Item = &CourseDefinition> {
        self.courses.values()
    }

    /// Looks up a course definition by code.
    #[must_use]
    pub fn course(&self, code: &str) -> Option<&CourseDefinition> {
        self.courses.get(code)
    }

    /// Returns user definitions in id order.
    pub fn users(&self) -> impl Iterator<Item = &UserDefinition> {
        self.users.values()
    }

    /// Builds a directory holding every defined user.
    #[must_use]
    pub fn user_directory(&self) -> UserDirectory {
        self.users.values().map(|d| d.user.clone()).collect()
    }
}

fn validate_enrollments(
    user: &User,
    courses: &BTreeMap<String, CourseDefinition>,
) -> Result<(), DefinitionError> {
    for (code, enrollment) in &user.courses {
        let Some(course) = courses.get(code) else {
            return Err(DefinitionError::UnknownCourse {
                user_id: user.user_id.clone(),
                code: code.clone(),
            });
        };
        for (kind, section) in [
            (
                SectionKind::Registration,
                enrollment.sections.registration_section,
            ),
            (SectionKind::Rotating, enrollment.sections.rotating_section),
        ] {
            let available = course.sections.count(kind);
            match section {
                Some(value) if !(1..=available).contains(&value) => {
                    return Err(DefinitionError::SectionOutOfRange {
                        user_id: user.user_id.clone(),
                        code: code.clone(),
                        kind,
                        section: value,
                        available,
                    });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Raw YAML representation of a course definition.
#[derive(Debug, Deserialize)]
struct RawCourseDefinition {
    code: String,
    instructor: String,
    registration_sections: u32,
    rotating_sections: u32,
    #[serde(default)]
    registered_students: usize,
    #[serde(default)]
    unregistered_students: usize,
    #[serde(default)]
    no_rotating_students: usize,
    #[serde(default)]
    no_registration_students: usize,
    #[serde(default)]
    regenerate_config: bool,
}

/// Raw YAML representation of a user definition.
#[derive(Debug, Deserialize)]
struct RawUserDefinition {
    user_id: String,
    numeric_id: u32,
    given_name: String,
    #[serde(default)]
    preferred_given_name: Option<String>,
    family_name: String,
    #[serde(default)]
    preferred_family_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    access_level: AccessLevel,
    #[serde(default)]
    pronouns: Option<String>,
    #[serde(default)]
    courses: Option<BTreeMap<String, RawEnrollment>>,
}

/// Raw YAML representation of a declared course membership.
#[derive(Debug, Deserialize)]
struct RawEnrollment {
    #[serde(default)]
    group: CourseGroup,
    #[serde(default)]
    registration_section: Option<u32>,
    #[serde(default)]
    rotating_section: Option<u32>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const COURSE_YAML: &str = "
code: sample
instructor: instructor
registration_sections: 10
rotating_sections: 5
registered_students: 50
unregistered_students: 10
no_rotating_students: 10
no_registration_students: 10
gradeables:
  - id: open_homework
";

    const USER_YAML: &str = "
user_id: ta
numeric_id: 123456789
given_name: Jill
family_name: TA
courses:
  sample:
    group: full_access_grader
    registration_section: 3
";

    fn course() -> CourseDefinition {
        CourseDefinition::from_yaml("sample.yml", COURSE_YAML).expect("valid course")
    }

    #[test]
    fn parses_course_and_ignores_unknown_keys() {
        let course = course();

        assert_eq!(course.code(), "sample");
        assert_eq!(course.instructor_id(), "instructor");
        assert_eq!(course.quotas().total(), 80);
        assert_eq!(course.sections().registration, 10);
        assert_eq!(course.sections().rotating, 5);
    }

    #[test]
    fn user_defaults_follow_platform_conventions() {
        let definition = UserDefinition::from_yaml("ta.yml", USER_YAML).expect("valid user");
        let user = definition.user();

        assert_eq!(user.email, "ta@example.com");
        assert_eq!(user.password, "ta");
        assert_eq!(user.access_level, AccessLevel::User);
        assert!(user.pronouns.is_empty());
        let enrollment = user.enrollment("sample").expect("declared enrollment");
        assert_eq!(enrollment.group, CourseGroup::FullAccessGrader);
        assert_eq!(
            enrollment.sections,
            SectionAssignment::new(Some(3), None)
        );
    }

    #[rstest]
    #[case::zero_registration(
        "code: c\ninstructor: i\nregistration_sections: 0\nrotating_sections: 1\n",
        DefinitionError::ZeroSectionCount { code: "c".to_owned(), kind: SectionKind::Registration }
    )]
    #[case::zero_rotating(
        "code: c\ninstructor: i\nregistration_sections: 1\nrotating_sections: 0\n",
        DefinitionError::ZeroSectionCount { code: "c".to_owned(), kind: SectionKind::Rotating }
    )]
    #[case::invalid_code(
        "code: Bad Code\ninstructor: i\nregistration_sections: 1\nrotating_sections: 1\n",
        DefinitionError::InvalidCourseCode { code: "Bad Code".to_owned() }
    )]
    fn rejects_invalid_courses(#[case] yaml: &str, #[case] expected: DefinitionError) {
        assert_eq!(CourseDefinition::from_yaml("c.yml", yaml), Err(expected));
    }

    #[test]
    fn rejects_malformed_course_yaml() {
        let result = CourseDefinition::from_yaml("broken.yml", "code: [unclosed");
        assert!(matches!(
            result,
            Err(DefinitionError::ParseError { ref source_name, .. }) if source_name == "broken.yml"
        ));
    }

    #[test]
    fn rejects_enrollment_in_unknown_course() {
        let user = UserDefinition::from_yaml("ta.yml", USER_YAML).expect("valid user");

        let result = Definitions::new(Vec::new(), vec![user]);

        assert_eq!(
            result,
            Err(DefinitionError::UnknownCourse {
                user_id: "ta".to_owned(),
                code: "sample".to_owned(),
            })
        );
    }

    #[test]
    fn rejects_declared_section_outside_range() {
        let yaml = USER_YAML.replace("registration_section: 3", "registration_section: 11");
        let user = UserDefinition::from_yaml("ta.yml", &yaml).expect("valid user");

        let result = Definitions::new(vec![course()], vec![user]);

        assert_eq!(
            result,
            Err(DefinitionError::SectionOutOfRange {
                user_id: "ta".to_owned(),
                code: "sample".to_owned(),
                kind: SectionKind::Registration,
                section: 11,
                available: 10,
            })
        );
    }

    #[test]
    fn rejects_duplicate_course_codes() {
        let result = Definitions::new(vec![course(), course()], Vec::new());
        assert_eq!(
            result,
            Err(DefinitionError::DuplicateCourse {
                code: "sample".to_owned()
            })
        );
    }

    const ADMIN_YAML: &str = "user_id: admin\nnumeric_id: 1\ngiven_name: A\nfamily_name: B\n";

    #[rstest]
    #[case::without_courses_key("", 2)]
    #[case::with_empty_courses("courses: {}\n", 0)]
    fn omitted_courses_key_joins_every_offered_course(
        #[case] courses: &str,
        #[case] expected_courses: usize,
    ) {
        let yaml = format!("{ADMIN_YAML}{courses}");
        let definition = UserDefinition::from_yaml("admin.yml", &yaml).expect("valid user");

        let user = definition.enrolled_user(["sample", "tutorial"]);

        assert_eq!(user.courses.len(), expected_courses);
        for enrollment in user.courses.values() {
            assert_eq!(enrollment.group, CourseGroup::Student);
            assert_eq!(enrollment.sections, SectionAssignment::unassigned());
        }
        assert!(definition.user().courses.is_empty());
    }

    #[test]
    fn declared_courses_are_kept_as_written() {
        let definition = UserDefinition::from_yaml("ta.yml", USER_YAML).expect("valid user");

        let user = definition.enrolled_user(["sample", "tutorial"]);

        assert!(definition.lists_courses());
        assert_eq!(user, *definition.user());
    }

    #[test]
    fn user_directory_contains_every_definition() {
        let user = UserDefinition::from_yaml("ta.yml", USER_YAML).expect("valid user");
        let definitions = Definitions::new(vec![course()], vec![user]).expect("valid set");

        let directory = definitions.user_directory();

        assert_eq!(directory.len(), 1);
        assert!(directory.contains("ta"));
    }
}
