//! Allocation of the shared synthetic pool across courses.
//!
//! The pool is generated once, sized to the largest course quota, and then
//! frozen. Every course reads its students from the front of the same pool:
//! a course needing `n` synthetic students receives pool entries `0..n`. The
//! overlap is intentional. Fixture data downstream is keyed to the resulting
//! rosters, so courses share synthetic students rather than partitioning the
//! pool into disjoint ranges.

use crate::course::Course;
use crate::error::AllocationError;
use crate::generator::UserPoolGenerator;
use crate::planner::assign_sections;
use crate::user::UserDirectory;

/// Ordered, immutable sequence of synthetic user ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntheticPool {
    user_ids: Vec<String>,
}

impl SyntheticPool {
    /// Returns the pool size needed to satisfy every course.
    ///
    /// # Example
    ///
    /// ```
    /// use sample_roster::{Course, PopulationQuotas, SectionCounts, SyntheticPool};
    ///
    /// let sections = SectionCounts { registration: 1, rotating: 1 };
    /// let small = Course::new(
    ///     "a".to_owned(),
    ///     "instructor".to_owned(),
    ///     PopulationQuotas { registered: 3, ..PopulationQuotas::default() },
    ///     sections,
    /// );
    /// let large = Course::new(
    ///     "b".to_owned(),
    ///     "instructor".to_owned(),
    ///     PopulationQuotas { registered: 5, unregistered: 2, ..PopulationQuotas::default() },
    ///     sections,
    /// );
    ///
    /// assert_eq!(SyntheticPool::required_size([&small, &large]), 7);
    /// ```
    #[must_use]
    pub fn required_size<'a, I>(courses: I) -> usize
    where
        I: IntoIterator<Item = &'a Course>,
    {
        courses
            .into_iter()
            .map(|course| course.quotas().total())
            .max()
            .unwrap_or(0)
    }

    /// Returns the pool ids in generation order.
    #[must_use]
    pub fn user_ids(&self) -> &[String] {
        &self.user_ids
    }

    /// Returns the first `len` ids, or `None` if the pool is shorter.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Option<&[String]> {
        self.user_ids.get(..len)
    }

    /// Returns the number of pooled users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    /// Returns `true` when no synthetic users were needed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }
}

/// Summary of one course allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseAllocation {
    /// Course code.
    pub code: String,
    /// Number of members declared in user definitions.
    pub declared: usize,
    /// Number of members drawn from the synthetic pool.
    pub synthetic: usize,
}

/// Owns the frozen synthetic pool and distributes it to courses.
#[derive(Debug, Clone)]
pub struct RosterAllocator {
    pool: SyntheticPool,
}

impl RosterAllocator {
    /// Generates the pool for `courses` and adds its users to `directory`.
    ///
    /// Exactly [`SyntheticPool::required_size`] users are generated, avoiding
    /// every id already in the directory.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Generation`] if the generator cannot produce
    /// enough unique users.
    pub fn generate(
        generator: &mut UserPoolGenerator,
        courses: &[Course],
        directory: &mut UserDirectory,
    ) -> Result<Self, AllocationError> {
        let required = SyntheticPool::required_size(courses);
        let users = generator.generate(required, &directory.ids())?;
        let user_ids = users.iter().map(|user| user.user_id.clone()).collect();
        directory.extend(users);

        tracing::info!(pool_size = required, "synthetic pool generated");
        Ok(Self::with_pool(SyntheticPool { user_ids }))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn with_pool(pool: SyntheticPool) -> Self {
        Self { pool }
    }

    /// Returns the frozen pool.
    #[must_use]
    pub const fn pool(&self) -> &SyntheticPool {
        &self.pool
    }

    /// Allocates every course in code order.
    ///
    /// # Errors
    ///
    /// Returns the first [`AllocationError`] raised by
    /// [`RosterAllocator::allocate_course`].
    pub fn allocate(
        &self,
        courses: &mut [Course],
        directory: &mut UserDirectory,
    ) -> Result<Vec<CourseAllocation>, AllocationError> {
        courses.sort_by(|a, b| a.code().cmp(b.code()));
        courses
            .iter_mut()
            .map(|course| self.allocate_course(course, directory))
            .collect()
    }

    /// Fills one course's membership.
    ///
    /// Declared members (users whose definitions already enroll them in the
    /// course) come first in id order, followed by the course's slice of the
    /// pool in planner order.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::UnknownInstructor`] if the instructor is not
    /// in the directory, [`AllocationError::PoolTooSmall`] if the pool cannot
    /// cover the quota sum, and [`AllocationError::Planning`] if section
    /// assignment fails.
    pub fn allocate_course(
        &self,
        course: &mut Course,
        directory: &mut UserDirectory,
    ) -> Result<CourseAllocation, AllocationError> {
        if !directory.contains(course.instructor_id()) {
            return Err(AllocationError::UnknownInstructor {
                code: course.code().to_owned(),
                instructor_id: course.instructor_id().to_owned(),
            });
        }

        let required = course.quotas().total();
        let slice = self
            .pool
            .prefix(required)
            .ok_or_else(|| AllocationError::PoolTooSmall {
                code: course.code().to_owned(),
                required,
                available: self.pool.len(),
            })?;

        let declared: Vec<String> = directory
            .iter()
            .filter(|user| user.enrollment(course.code()).is_some())
            .map(|user| user.user_id.clone())
            .collect();
        let declared_count = declared.len();
        for user_id in declared {
            course.push_member(user_id);
        }

        assign_sections(course, slice, directory)?;

        tracing::info!(
            course = course.code(),
            declared = declared_count,
            synthetic = required,
            members = course.members().len(),
            "course roster allocated"
        );
        Ok(CourseAllocation {
            code: course.code().to_owned(),
            declared: declared_count,
            synthetic: required,
        })
    }
}
