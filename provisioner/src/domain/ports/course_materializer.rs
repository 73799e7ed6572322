//! Port abstraction for building a course's on-disk structure.

use crate::domain::records::CourseRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised by course materializer adapters.
    pub enum MaterializerError {
        /// A course directory or file could not be created.
        Filesystem { course: String, path: String, message: String } =>
            "failed to materialize course {course} at {path}: {message}",
        /// The course configuration could not be encoded.
        Encode { course: String, message: String } =>
            "failed to encode configuration for course {course}: {message}",
    }
}

/// Everything a materializer needs to build one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeRequest {
    /// The persisted course and its sorted membership.
    pub course: CourseRecord,
    /// Rewrite the course configuration file.
    pub regenerate_config: bool,
    /// Create per-student submission directories.
    pub include_submissions: bool,
}

/// Port for materializing one course after allocation.
///
/// Called once per course, in code order, unless the run is database-only.
#[cfg_attr(test, mockall::automock)]
pub trait CourseMaterializer {
    /// Builds the course structure.
    fn materialize(&self, request: &MaterializeRequest) -> Result<(), MaterializerError>;
}
