//! Section assignment for a course's allotted students.
//!
//! Students are processed in four consecutive runs whose lengths come from
//! the course quotas:
//!
//! 1. `registered`: registration and rotating sections
//! 2. `no_rotating`: registration section only
//! 3. `no_registration`: rotating section only
//! 4. `unregistered`: neither
//!
//! Within each run the student at position `i` receives section
//! `(i mod count) + 1`, so indices restart at 1 for every run and always
//! fall in `1..=count`.

use crate::course::{Course, SectionKind};
use crate::error::PlanningError;
use crate::user::{Enrollment, SectionAssignment, UserDirectory};

/// One student's planned sections for a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStudent {
    /// The student's user id.
    pub user_id: String,
    /// The sections the student receives.
    pub sections: SectionAssignment,
}

/// Computes section assignments for `students` in processing order.
///
/// This is a pure function of the course quotas, section counts and the
/// student order; [`assign_sections`] applies the result.
///
/// # Errors
///
/// Returns [`PlanningError::ZeroSectionCount`] if either section count is
/// zero and [`PlanningError::StudentCountMismatch`] if the number of students
/// differs from the quota sum.
///
/// # Example
///
/// ```
/// use sample_roster::{Course, PopulationQuotas, SectionAssignment, SectionCounts, plan_sections};
///
/// let course = Course::new(
///     "sample".to_owned(),
///     "instructor".to_owned(),
///     PopulationQuotas { registered: 2, unregistered: 1, no_rotating: 0, no_registration: 0 },
///     SectionCounts { registration: 2, rotating: 3 },
/// );
/// let students = ["a".to_owned(), "b".to_owned(), "c".to_owned()];
///
/// let plan = plan_sections(&course, &students).expect("valid plan");
/// let sections: Vec<_> = plan.iter().map(|p| p.sections).collect();
///
/// assert_eq!(
///     sections,
///     [
///         SectionAssignment::new(Some(1), Some(1)),
///         SectionAssignment::new(Some(2), Some(2)),
///         SectionAssignment::new(None, None),
///     ]
/// );
/// ```
pub fn plan_sections(
    course: &Course,
    students: &[String],
) -> Result<Vec<PlannedStudent>, PlanningError> {
    let sections = course.sections();
    for kind in [SectionKind::Registration, SectionKind::Rotating] {
        if sections.count(kind) == 0 {
            return Err(PlanningError::ZeroSectionCount {
                code: course.code().to_owned(),
                kind,
            });
        }
    }

    let quotas = course.quotas();
    let mismatch = || PlanningError::StudentCountMismatch {
        code: course.code().to_owned(),
        expected: quotas.total(),
        actual: students.len(),
    };
    if students.len() != quotas.total() {
        return Err(mismatch());
    }

    let (registered, rest) = students
        .split_at_checked(quotas.registered)
        .ok_or_else(mismatch)?;
    let (no_rotating, rest) = rest
        .split_at_checked(quotas.no_rotating)
        .ok_or_else(mismatch)?;
    let (no_registration, unregistered) = rest
        .split_at_checked(quotas.no_registration)
        .ok_or_else(mismatch)?;

    let registration = || cycle(sections.registration);
    let rotating = || cycle(sections.rotating);

    let mut planned = Vec::with_capacity(students.len());
    planned.extend(
        registered
            .iter()
            .zip(registration().zip(rotating()))
            .map(|(id, (reg, rot))| planned_student(id, Some(reg), Some(rot))),
    );
    planned.extend(
        no_rotating
            .iter()
            .zip(registration())
            .map(|(id, reg)| planned_student(id, Some(reg), None)),
    );
    planned.extend(
        no_registration
            .iter()
            .zip(rotating())
            .map(|(id, rot)| planned_student(id, None, Some(rot))),
    );
    planned.extend(
        unregistered
            .iter()
            .map(|id| planned_student(id, None, None)),
    );

    Ok(planned)
}

/// Assigns sections to `students` and appends them to the course membership.
///
/// Each student receives a student enrollment for the course, written exactly
/// once, and the membership list grows in processing order. Nothing is
/// mutated unless every student resolves and none is already enrolled.
///
/// # Errors
///
/// Returns the errors of [`plan_sections`], plus
/// [`PlanningError::UnknownUser`] if a student id is not in the directory and
/// [`PlanningError::DuplicateAssignment`] if a student is already enrolled.
pub fn assign_sections(
    course: &mut Course,
    students: &[String],
    directory: &mut UserDirectory,
) -> Result<(), PlanningError> {
    let planned = plan_sections(course, students)?;

    for entry in &planned {
        let user = directory
            .get(&entry.user_id)
            .ok_or_else(|| PlanningError::UnknownUser {
                user_id: entry.user_id.clone(),
            })?;
        if user.enrollment(course.code()).is_some() {
            return Err(PlanningError::DuplicateAssignment {
                code: course.code().to_owned(),
                user_id: entry.user_id.clone(),
            });
        }
    }

    for entry in planned {
        let user = directory
            .get_mut(&entry.user_id)
            .ok_or_else(|| PlanningError::UnknownUser {
                user_id: entry.user_id.clone(),
            })?;
        user.enroll(course.code(), Enrollment::student(entry.sections))?;
        course.push_member(entry.user_id);
    }

    Ok(())
}

/// Yields `1, 2, ..., count, 1, 2, ...`.
fn cycle(count: u32) -> impl Iterator<Item = u32> + Clone {
    (1..=count).cycle()
}

fn planned_student(
    user_id: &str,
    registration_section: Option<u32>,
    rotating_section: Option<u32>,
) -> PlannedStudent {
    PlannedStudent {
        user_id: user_id.to_owned(),
        sections: SectionAssignment::new(registration_section, rotating_section),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::*;
    use crate::course::{PopulationQuotas, SectionCounts};
    use crate::user::{AccessLevel, User};

    fn course(quotas: PopulationQuotas, registration: u32, rotating: u32) -> Course {
        Course::new(
            "sample".to_owned(),
            "instructor".to_owned(),
            quotas,
            SectionCounts {
                registration,
                rotating,
            },
        )
    }

    const fn quotas(
        registered: usize,
        unregistered: usize,
        no_rotating: usize,
        no_registration: usize,
    ) -> PopulationQuotas {
        PopulationQuotas {
            registered,
            unregistered,
            no_rotating,
            no_registration,
        }
    }

    fn students(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("student{i:03}")).collect()
    }

    fn user(user_id: &str) -> User {
        User {
            user_id: user_id.to_owned(),
            numeric_id: 100_000_000,
            given_name: "Given".to_owned(),
            preferred_given_name: None,
            family_name: "Family".to_owned(),
            preferred_family_name: None,
            email: format!("{user_id}@example.com"),
            password: user_id.to_owned(),
            access_level: AccessLevel::User,
            pronouns: String::new(),
            courses: BTreeMap::new(),
        }
    }

    fn directory(ids: &[String]) -> UserDirectory {
        ids.iter().map(|id| user(id)).collect()
    }

    #[test]
    fn two_registered_one_unregistered_scenario() {
        let course = course(quotas(2, 1, 0, 0), 2, 3);
        let plan = plan_sections(&course, &students(3)).expect("valid plan");
        let sections: Vec<_> = plan.iter().map(|p| p.sections).collect();

        assert_eq!(
            sections,
            [
                SectionAssignment::new(Some(1), Some(1)),
                SectionAssignment::new(Some(2), Some(2)),
                SectionAssignment::new(None, None),
            ]
        );
    }

    #[rstest]
    #[case(quotas(7, 3, 4, 5), 3, 2)]
    #[case(quotas(50, 10, 10, 10), 10, 5)]
    #[case(quotas(1, 0, 0, 0), 1, 1)]
    #[case(quotas(0, 2, 0, 3), 4, 4)]
    fn runs_follow_fixed_order_and_index_rule(
        #[case] population: PopulationQuotas,
        #[case] registration: u32,
        #[case] rotating: u32,
    ) {
        let course = course(population, registration, rotating);
        let ids = students(population.total());
        let plan = plan_sections(&course, &ids).expect("valid plan");

        assert_eq!(plan.len(), population.total());
        let planned_ids: Vec<_> = plan.iter().map(|p| p.user_id.clone()).collect();
        assert_eq!(planned_ids, ids);

        let expected = |i: usize, count: u32| {
            let divisor = usize::try_from(count).expect("section count fits usize");
            u32::try_from(i.rem_euclid(divisor) + 1).expect("section fits u32")
        };
        let mut entries = plan.iter();
        for i in 0..population.registered {
            let entry = entries.next().expect("registered entry");
            assert_eq!(
                entry.sections,
                SectionAssignment::new(
                    Some(expected(i, registration)),
                    Some(expected(i, rotating))
                )
            );
        }
        for i in 0..population.no_rotating {
            let entry = entries.next().expect("no-rotating entry");
            assert_eq!(
                entry.sections,
                SectionAssignment::new(Some(expected(i, registration)), None)
            );
        }
        for i in 0..population.no_registration {
            let entry = entries.next().expect("no-registration entry");
            assert_eq!(
                entry.sections,
                SectionAssignment::new(None, Some(expected(i, rotating)))
            );
        }
        for _ in 0..population.unregistered {
            let entry = entries.next().expect("unregistered entry");
            assert_eq!(entry.sections, SectionAssignment::unassigned());
        }
        assert!(entries.next().is_none());
    }

    #[rstest]
    #[case(0, 3, SectionKind::Registration)]
    #[case(2, 0, SectionKind::Rotating)]
    #[case(0, 0, SectionKind::Registration)]
    fn zero_section_count_fails(
        #[case] registration: u32,
        #[case] rotating: u32,
        #[case] kind: SectionKind,
    ) {
        let course = course(quotas(2, 1, 0, 0), registration, rotating);

        let result = plan_sections(&course, &students(3));

        assert_eq!(
            result,
            Err(PlanningError::ZeroSectionCount {
                code: "sample".to_owned(),
                kind,
            })
        );
    }

    #[test]
    fn zero_section_count_fails_even_without_students() {
        let course = course(quotas(0, 0, 0, 0), 0, 1);
        assert!(plan_sections(&course, &[]).is_err());
    }

    #[test]
    fn student_count_must_match_quota_sum() {
        let course = course(quotas(2, 1, 0, 0), 2, 3);

        let result = plan_sections(&course, &students(2));

        assert_eq!(
            result,
            Err(PlanningError::StudentCountMismatch {
                code: "sample".to_owned(),
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn assign_writes_enrollments_and_membership_in_order() {
        let mut course = course(quotas(2, 1, 0, 0), 2, 3);
        let ids = vec!["zoe".to_owned(), "amy".to_owned(), "max".to_owned()];
        let mut directory = directory(&ids);

        assign_sections(&mut course, &ids, &mut directory).expect("assignment succeeds");

        assert_eq!(course.members(), ids.as_slice());
        assert_eq!(course.sorted_members(), ["amy", "max", "zoe"]);
        let amy = directory
            .get("amy")
            .and_then(|u| u.enrollment("sample"))
            .expect("amy enrolled");
        assert_eq!(amy.sections, SectionAssignment::new(Some(2), Some(2)));
        let max = directory
            .get("max")
            .and_then(|u| u.enrollment("sample"))
            .expect("max enrolled");
        assert_eq!(max.sections, SectionAssignment::unassigned());
    }

    #[test]
    fn assign_rejects_unknown_users_without_mutation() {
        let mut course = course(quotas(2, 0, 0, 0), 1, 1);
        let ids = students(2);
        let mut directory = directory(ids.get(..1).expect("one id"));

        let result = assign_sections(&mut course, &ids, &mut directory);

        assert!(matches!(result, Err(PlanningError::UnknownUser { .. })));
        assert!(course.members().is_empty());
        assert!(directory.iter().all(|u| u.courses.is_empty()));
    }

    #[test]
    fn assign_rejects_second_assignment_for_same_course() {
        let ids = students(1);
        let mut directory = directory(&ids);
        let mut first = course(quotas(1, 0, 0, 0), 1, 1);
        assign_sections(&mut first, &ids, &mut directory).expect("first assignment");

        let mut again = course(quotas(1, 0, 0, 0), 1, 1);
        let result = assign_sections(&mut again, &ids, &mut directory);

        assert_eq!(
            result,
            Err(PlanningError::DuplicateAssignment {
                code: "sample".to_owned(),
                user_id: "student000".to_owned(),
            })
        );
    }
}
