//! Deterministic roster synthesis for sample grading courses.
//!
//! Given course and user definitions plus a seed, this crate produces the
//! same set of synthetic students, the same course memberships and the same
//! section assignments on every run. It performs no I/O; the provisioner
//! crate feeds it parsed definitions and persists what it returns.
//!
//! # Overview
//!
//! - [`Definitions`] validates course and user YAML up front
//! - [`UserPoolGenerator`] draws unique synthetic users from a seeded RNG
//! - [`RosterAllocator`] hands each course a prefix of one shared pool
//! - [`plan_sections`] assigns registration and rotating section indices
//! - [`Term`] derives the academic term from a calendar date
//!
//! # Example
//!
//! ```
//! use sample_roster::{
//!     CourseDefinition, Definitions, RosterAllocator, RosterContext, UserDefinition,
//!     UserPoolGenerator,
//! };
//!
//! let course = CourseDefinition::from_yaml(
//!     "sample.yml",
//!     "code: sample\ninstructor: instructor\nregistration_sections: 2\n\
//!      rotating_sections: 3\nregistered_students: 2\nunregistered_students: 1\n",
//! )
//! .expect("valid course");
//! let instructor = UserDefinition::from_yaml(
//!     "instructor.yml",
//!     "user_id: instructor\nnumeric_id: 801516157\ngiven_name: Quinn\n\
//!      family_name: Instructor\naccess_level: faculty\n",
//! )
//! .expect("valid user");
//! let definitions = Definitions::new(vec![course], vec![instructor]).expect("valid definitions");
//!
//! let mut directory = definitions.user_directory();
//! let mut courses: Vec<_> = definitions.courses().map(CourseDefinition::to_course).collect();
//! let mut generator = UserPoolGenerator::new(&RosterContext::default());
//! let allocator =
//!     RosterAllocator::generate(&mut generator, &courses, &mut directory).expect("pool");
//! allocator.allocate(&mut courses, &mut directory).expect("allocation");
//!
//! let sample = courses.first().expect("sample course");
//! assert_eq!(sample.members().len(), 3);
//! ```

mod allocator;
mod context;
mod course;
mod definitions;
mod error;
mod generator;
mod planner;
mod term;
mod user;
mod validation;

pub use allocator::{CourseAllocation, RosterAllocator, SyntheticPool};
pub use context::{
    DEFAULT_EXCLUDED_USER_IDS, DEFAULT_RESERVED_PREFIX, DEFAULT_SEED, RosterContext,
};
pub use course::{Course, PopulationQuotas, SectionCounts, SectionKind};
pub use definitions::{CourseDefinition, Definitions, UserDefinition};
pub use error::{AllocationError, DefinitionError, GenerationError, PlanningError, TermError};
pub use generator::{MAX_ID_SUFFIX, MAX_NAME_ATTEMPTS, UserPoolGenerator};
pub use planner::{PlannedStudent, assign_sections, plan_sections};
pub use term::{Season, Term};
pub use user::{AccessLevel, CourseGroup, Enrollment, SectionAssignment, User, UserDirectory};
pub use validation::{COURSE_CODE_MAX, USER_ID_MAX, is_valid_course_code, is_valid_user_id};
