//! Shared definition fixtures for the integration tests.

use sample_roster::{
    Course, CourseDefinition, Definitions, RosterAllocator, RosterContext, UserDefinition,
    UserDirectory, UserPoolGenerator,
};

pub const SAMPLE_COURSE: &str = "
code: sample
instructor: instructor
registration_sections: 10
rotating_sections: 5
registered_students: 50
unregistered_students: 10
no_rotating_students: 10
no_registration_students: 10
";

pub const TUTORIAL_COURSE: &str = "
code: tutorial
instructor: instructor
registration_sections: 2
rotating_sections: 3
registered_students: 2
unregistered_students: 1
";

pub const INSTRUCTOR: &str = "
user_id: instructor
numeric_id: 801516157
given_name: Quinn
family_name: Instructor
access_level: faculty
courses:
  sample:
    group: instructor
    registration_section: 1
  tutorial:
    group: instructor
    registration_section: 1
";

pub const TA: &str = "
user_id: ta
numeric_id: 800000001
given_name: Terry
family_name: Assistant
courses:
  sample:
    group: full_access_grader
    registration_section: 1
    rotating_section: 1
";

/// Parses the fixture definitions.
pub fn definitions() -> Definitions {
    let courses = [("sample.yml", SAMPLE_COURSE), ("tutorial.yml", TUTORIAL_COURSE)]
        .into_iter()
        .map(|(name, yaml)| CourseDefinition::from_yaml(name, yaml).expect("valid course"))
        .collect();
    let users = [("instructor.yml", INSTRUCTOR), ("ta.yml", TA)]
        .into_iter()
        .map(|(name, yaml)| UserDefinition::from_yaml(name, yaml).expect("valid user"))
        .collect();
    Definitions::new(courses, users).expect("valid definitions")
}

/// Result of allocating the fixture definitions.
pub struct Allocation {
    pub allocator: RosterAllocator,
    pub courses: Vec<Course>,
    pub directory: UserDirectory,
}

/// Runs generation and allocation with `seed`.
pub fn allocate(seed: u64) -> Allocation {
    let definitions = definitions();
    let mut directory = definitions.user_directory();
    let mut courses: Vec<Course> = definitions
        .courses()
        .map(CourseDefinition::to_course)
        .collect();
    let mut generator = UserPoolGenerator::new(&RosterContext::new(seed));
    let allocator = RosterAllocator::generate(&mut generator, &courses, &mut directory)
        .expect("pool generated");
    allocator
        .allocate(&mut courses, &mut directory)
        .expect("allocation succeeds");
    Allocation {
        allocator,
        courses,
        directory,
    }
}
