//! Error types for the sample-roster crate.
//!
//! This module defines semantic error enums for definition loading, pool
//! generation, section planning, roster allocation, and term computation,
//! following the project's error handling conventions with `thiserror`.

use thiserror::Error;

use crate::course::SectionKind;

/// Errors raised while parsing or validating course and user definitions.
///
/// All definition problems are configuration errors: they are reported before
/// any collaborator is asked to mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A definition document is malformed or missing required fields.
    #[error("invalid definition in '{source_name}': {message}")]
    ParseError {
        /// Name of the document that failed to parse.
        source_name: String,
        /// Description of the parse error.
        message: String,
    },

    /// Two course definitions share the same code.
    #[error("course '{code}' is defined more than once")]
    DuplicateCourse {
        /// The duplicated course code.
        code: String,
    },

    /// Two user definitions share the same id.
    #[error("user '{user_id}' is defined more than once")]
    DuplicateUser {
        /// The duplicated user id.
        user_id: String,
    },

    /// A course declares zero sections of one kind.
    #[error("course '{code}' declares zero {kind} sections")]
    ZeroSectionCount {
        /// Code of the offending course.
        code: String,
        /// Which section count is zero.
        kind: SectionKind,
    },

    /// A course code is empty or contains unsupported characters.
    #[error("invalid course code '{code}'")]
    InvalidCourseCode {
        /// The rejected course code.
        code: String,
    },

    /// A user id is empty or contains unsupported characters.
    #[error("invalid user id '{user_id}'")]
    InvalidUserId {
        /// The rejected user id.
        user_id: String,
    },

    /// A user enrollment refers to a course that is not defined.
    #[error("user '{user_id}' is enrolled in unknown course '{code}'")]
    UnknownCourse {
        /// The user declaring the enrollment.
        user_id: String,
        /// The unknown course code.
        code: String,
    },

    /// A declared section index is outside the course's section range.
    #[error(
        "user '{user_id}' declares {kind} section {section} in course '{code}' \
         which only has {available}"
    )]
    SectionOutOfRange {
        /// The user declaring the enrollment.
        user_id: String,
        /// The course code.
        code: String,
        /// Which section kind is out of range.
        kind: SectionKind,
        /// The declared section index.
        section: u32,
        /// The number of sections the course declares.
        available: u32,
    },
}

/// Errors raised while synthesizing the extra-user pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No unused user id could be derived after the maximum number of name draws.
    #[error("failed to derive an unused user id after {max_attempts} name draws")]
    IdSpaceExhausted {
        /// Number of name draws made before giving up.
        max_attempts: usize,
    },

    /// No unused numeric id could be drawn after the maximum number of attempts.
    #[error("failed to draw an unused numeric id after {max_attempts} attempts")]
    NumericIdSpaceExhausted {
        /// Number of draws made before giving up.
        max_attempts: usize,
    },
}

/// Errors raised while assigning sections to a course's students.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// A course declares zero sections of one kind, so indices cannot be derived.
    #[error("course '{code}' has zero {kind} sections")]
    ZeroSectionCount {
        /// Code of the offending course.
        code: String,
        /// Which section count is zero.
        kind: SectionKind,
    },

    /// The number of students handed to the planner differs from the quota sum.
    #[error("course '{code}' expects {expected} students but {actual} were supplied")]
    StudentCountMismatch {
        /// Code of the course being planned.
        code: String,
        /// Sum of the course's population quotas.
        expected: usize,
        /// Number of students supplied.
        actual: usize,
    },

    /// A student already holds an enrollment for the course.
    #[error("user '{user_id}' already has an enrollment in course '{code}'")]
    DuplicateAssignment {
        /// Code of the course being planned.
        code: String,
        /// The user that was assigned twice.
        user_id: String,
    },

    /// A student id does not resolve to a known user.
    #[error("user '{user_id}' is not present in the user directory")]
    UnknownUser {
        /// The unresolved user id.
        user_id: String,
    },
}

/// Errors raised while allocating the synthetic pool across courses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Pool generation failed.
    #[error("synthetic pool generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Section planning failed for a course.
    #[error("section planning failed: {0}")]
    Planning(#[from] PlanningError),

    /// A course needs more synthetic students than the frozen pool holds.
    #[error("course '{code}' needs {required} synthetic students but the pool holds {available}")]
    PoolTooSmall {
        /// Code of the course being allocated.
        code: String,
        /// Quota sum of the course.
        required: usize,
        /// Size of the frozen pool.
        available: usize,
    },

    /// A course's instructor id does not resolve to a known user.
    #[error("course '{code}' names unknown instructor '{instructor_id}'")]
    UnknownInstructor {
        /// Code of the course.
        code: String,
        /// The unresolved instructor id.
        instructor_id: String,
    },
}

/// Errors raised while computing the academic term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    /// The term boundaries cannot be represented for the given year.
    #[error("term boundaries are not representable for year {year}")]
    OutOfRange {
        /// The calendar year that could not be represented.
        year: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_error_parse_formats_correctly() {
        let err = DefinitionError::ParseError {
            source_name: "courses/sample.yml".to_owned(),
            message: "missing field `code`".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "invalid definition in 'courses/sample.yml': missing field `code`"
        );
    }

    #[test]
    fn definition_error_zero_sections_names_kind() {
        let err = DefinitionError::ZeroSectionCount {
            code: "sample".to_owned(),
            kind: SectionKind::Rotating,
        };
        assert_eq!(err.to_string(), "course 'sample' declares zero rotating sections");
    }

    #[test]
    fn generation_error_exhaustion_formats_correctly() {
        let err = GenerationError::IdSpaceExhausted { max_attempts: 100 };
        assert_eq!(
            err.to_string(),
            "failed to derive an unused user id after 100 name draws"
        );
    }

    #[test]
    fn planning_error_mismatch_formats_correctly() {
        let err = PlanningError::StudentCountMismatch {
            code: "sample".to_owned(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "course 'sample' expects 3 students but 2 were supplied"
        );
    }

    #[test]
    fn allocation_error_wraps_planning_error() {
        let err = AllocationError::from(PlanningError::ZeroSectionCount {
            code: "sample".to_owned(),
            kind: SectionKind::Registration,
        });
        assert_eq!(
            err.to_string(),
            "section planning failed: course 'sample' has zero registration sections"
        );
    }

    #[test]
    fn term_error_formats_correctly() {
        let err = TermError::OutOfRange { year: 300_000 };
        assert_eq!(
            err.to_string(),
            "term boundaries are not representable for year 300000"
        );
    }
}
