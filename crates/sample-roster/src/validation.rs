//! Identifier validation for user ids and course codes.
//!
//! User ids double as account names and database keys on the grading
//! platform, so both real and synthetic ids are held to the same rules.
//!
//! # Validation Rules
//!
//! - User ids: 1 to 32 characters; ASCII letters, digits, `_`, `-` and `.`
//! - Course codes: 1 to 64 characters; lowercase ASCII letters, digits, `_`
//!   and `-`

/// Maximum allowed length for a user id.
pub const USER_ID_MAX: usize = 32;

/// Maximum allowed length for a course code.
pub const COURSE_CODE_MAX: usize = 64;

/// Validates a user id against account naming constraints.
///
/// # Examples
///
/// ```
/// use sample_roster::is_valid_user_id;
///
/// assert!(is_valid_user_id("instructor"));
/// assert!(is_valid_user_id("smithj2"));
/// assert!(!is_valid_user_id(""));
/// assert!(!is_valid_user_id("o'brien"));
/// ```
#[must_use]
pub fn is_valid_user_id(user_id: &str) -> bool {
    let length = user_id.chars().count();
    (1..=USER_ID_MAX).contains(&length) && user_id.chars().all(is_valid_user_id_char)
}

/// Validates a course code.
///
/// # Examples
///
/// ```
/// use sample_roster::is_valid_course_code;
///
/// assert!(is_valid_course_code("sample"));
/// assert!(is_valid_course_code("tutorial-2"));
/// assert!(!is_valid_course_code("Sample"));
/// ```
#[must_use]
pub fn is_valid_course_code(code: &str) -> bool {
    let length = code.chars().count();
    (1..=COURSE_CODE_MAX).contains(&length)
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

const fn is_valid_user_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Reduces a display name to at most `max_chars` lowercase ASCII alphanumerics.
///
/// Used to derive synthetic user ids from generated names, where apostrophes,
/// hyphens and spaces are dropped rather than replaced.
#[must_use]
pub(crate) fn id_fragment(name: &str, max_chars: usize) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(max_chars)
        .collect()
}
