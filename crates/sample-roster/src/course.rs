//! Course records, population quotas and section counts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two independent section groupings of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Official enrollment section.
    Registration,
    /// Rotating section used for grading duty and office hours.
    Rotating,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registration => "registration",
            Self::Rotating => "rotating",
        })
    }
}

/// Number of synthetic students a course receives in each population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationQuotas {
    /// Students with both a registration and a rotating section.
    pub registered: usize,
    /// Students with neither section.
    pub unregistered: usize,
    /// Students with a registration section but no rotating section.
    pub no_rotating: usize,
    /// Students with a rotating section but no registration section.
    pub no_registration: usize,
}

impl PopulationQuotas {
    /// Returns the number of synthetic students the course needs.
    ///
    /// # Example
    ///
    /// ```
    /// use sample_roster::PopulationQuotas;
    ///
    /// let quotas = PopulationQuotas {
    ///     registered: 2,
    ///     unregistered: 1,
    ///     no_rotating: 0,
    ///     no_registration: 0,
    /// };
    /// assert_eq!(quotas.total(), 3);
    /// ```
    #[must_use]
    pub const fn total(&self) -> usize {
        self.registered
            .saturating_add(self.unregistered)
            .saturating_add(self.no_rotating)
            .saturating_add(self.no_registration)
    }
}

/// Number of sections of each kind a course is divided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCounts {
    /// Number of registration sections.
    pub registration: u32,
    /// Number of rotating sections.
    pub rotating: u32,
}

impl SectionCounts {
    /// Returns the count for one section kind.
    #[must_use]
    pub const fn count(&self, kind: SectionKind) -> u32 {
        match kind {
            SectionKind::Registration => self.registration,
            SectionKind::Rotating => self.rotating,
        }
    }
}

/// A course and its membership for the current run.
///
/// `members` holds user ids in assignment order. Persistence consumes
/// [`Course::sorted_members`] instead, so the two orders are decoupled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    code: String,
    instructor_id: String,
    quotas: PopulationQuotas,
    sections: SectionCounts,
    regenerate_config: bool,
    members: Vec<String>,
}

impl Course {
    /// Creates a course with an empty membership list.
    #[must_use]
    pub const fn new(
        code: String,
        instructor_id: String,
        quotas: PopulationQuotas,
        sections: SectionCounts,
    ) -> Self {
        Self {
            code,
            instructor_id,
            quotas,
            sections,
            regenerate_config: false,
            members: Vec::new(),
        }
    }

    /// Requests regeneration of the course configuration artifact.
    #[must_use]
    pub const fn with_regenerate_config(mut self, regenerate_config: bool) -> Self {
        self.regenerate_config = regenerate_config;
        self
    }

    /// Returns the course code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the id of the course instructor.
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

    /// Returns `true` when the materializer should regenerate the config.
    #[must_use]
    pub const fn regenerate_config(&self) -> bool {
        self.regenerate_config
    }

    /// Returns member ids in assignment order.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns member ids sorted by user id, the order persistence expects.
    #[must_use]
    pub fn sorted_members(&self) -> Vec<String> {
        let mut sorted = self.members.clone();
        sorted.sort();
        sorted
    }

    pub(crate) fn push_member(&mut self, user_id: String) {
        self.members.push(user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course::new(
            "sample".to_owned(),
            "instructor".to_owned(),
            PopulationQuotas::default(),
            SectionCounts {
                registration: 2,
                rotating: 3,
            },
        )
    }

    #[test]
    fn quota_total_sums_all_populations() {
        let quotas = PopulationQuotas {
            registered: 50,
            unregistered: 10,
            no_rotating: 5,
            no_registration: 7,
        };
        assert_eq!(quotas.total(), 72);
    }

    #[test]
    fn sorted_members_leaves_assignment_order_untouched() {
        let mut course = course();
        course.push_member("zed".to_owned());
        course.push_member("abe".to_owned());

        assert_eq!(course.members(), ["zed", "abe"]);
        assert_eq!(course.sorted_members(), ["abe", "zed"]);
    }

    #[test]
    fn section_counts_lookup_by_kind() {
        let sections = course().sections();
        assert_eq!(sections.count(SectionKind::Registration), 2);
        assert_eq!(sections.count(SectionKind::Rotating), 3);
    }

    #[test]
    fn section_kind_displays_lowercase() {
        assert_eq!(SectionKind::Registration.to_string(), "registration");
    }
}
