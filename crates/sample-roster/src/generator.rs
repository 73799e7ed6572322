//! Deterministic synthetic user generation.
//!
//! This module provides the pool generator that pads course rosters with
//! believable, reproducible users. A generator owns a single ChaCha8 stream
//! seeded from the run context; every call draws from that stream, so the
//! same seed always yields the same sequence, and a pool of `n` users is a
//! prefix of a pool of `m > n` users.

use std::collections::{BTreeMap, BTreeSet};

use fake::Fake;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::context::RosterContext;
use crate::error::GenerationError;
use crate::user::{AccessLevel, User};
use crate::validation::{id_fragment, is_valid_user_id};

/// Maximum number of name draws made for a single user.
pub const MAX_NAME_ATTEMPTS: usize = 100;

/// Largest numeric suffix appended to a colliding user id.
pub const MAX_ID_SUFFIX: u32 = 99;

/// Maximum number of draws made for an unused numeric id.
const MAX_NUMERIC_ATTEMPTS: usize = 1_000;

/// Number of family-name characters used in a synthetic user id.
const FAMILY_FRAGMENT_LEN: usize = 5;

/// Numeric ids are nine digits long.
const NUMERIC_ID_RANGE: std::ops::RangeInclusive<u32> = 100_000_000..=999_999_999;

/// Email domain for synthetic users.
const EMAIL_DOMAIN: &str = "example.com";

/// Pronoun choices for synthetic users; empty means unspecified.
const PRONOUNS: [&str; 4] = ["", "she/her", "he/him", "they/them"];

/// Synthesizes unique users from a seeded random stream.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
///
/// use sample_roster::{RosterContext, UserPoolGenerator};
///
/// let context = RosterContext::new(42);
/// let existing = BTreeSet::from(["instructor".to_owned()]);
///
/// let first = UserPoolGenerator::new(&context)
///     .generate(5, &existing)
///     .expect("generation succeeds");
/// let second = UserPoolGenerator::new(&context)
///     .generate(5, &existing)
///     .expect("generation succeeds");
///
/// assert_eq!(first.len(), 5);
/// assert_eq!(first, second);
/// ```
#[derive(Debug, Clone)]
pub struct UserPoolGenerator {
    rng: ChaCha8Rng,
    context: RosterContext,
    issued_ids: BTreeSet<String>,
    issued_numeric_ids: BTreeSet<u32>,
    max_name_attempts: usize,
    max_id_suffix: u32,
}

impl UserPoolGenerator {
    /// Creates a generator seeded from the context.
    ///
    /// The stream is seeded exactly once, here.
    #[must_use]
    pub fn new(context: &RosterContext) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(context.seed()),
            context: context.clone(),
            issued_ids: BTreeSet::new(),
            issued_numeric_ids: BTreeSet::new(),
            max_name_attempts: MAX_NAME_ATTEMPTS,
            max_id_suffix: MAX_ID_SUFFIX,
        }
    }

    /// Overrides the name-draw and id-suffix limits.
    #[must_use]
    pub const fn with_limits(mut self, max_name_attempts: usize, max_id_suffix: u32) -> Self {
        self.max_name_attempts = max_name_attempts;
        self.max_id_suffix = max_id_suffix;
        self
    }

    /// Generates exactly `count` users whose ids avoid `existing_ids`, the
    /// context's excluded accounts, and every id this generator issued before.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when no unused user id or numeric id can be
    /// found within the configured limits. The pool is never truncated.
    pub fn generate(
        &mut self,
        count: usize,
        existing_ids: &BTreeSet<String>,
    ) -> Result<Vec<User>, GenerationError> {
        let mut users = Vec::with_capacity(count);
        for _ in 0..count {
            users.push(self.generate_single_user(existing_ids)?);
        }
        tracing::debug!(count, issued = self.issued_ids.len(), "synthetic users generated");
        Ok(users)
    }

    fn generate_single_user(
        &mut self,
        existing_ids: &BTreeSet<String>,
    ) -> Result<User, GenerationError> {
        let (given_name, family_name, user_id) = self.draw_identity(existing_ids)?;
        let numeric_id = self.draw_numeric_id()?;
        let pronouns = PRONOUNS
            .choose(&mut self.rng)
            .map_or_else(String::new, |p| (*p).to_owned());

        self.issued_ids.insert(user_id.clone());
        self.issued_numeric_ids.insert(numeric_id);

        Ok(User {
            email: format!("{user_id}@{EMAIL_DOMAIN}"),
            password: user_id.clone(),
            user_id,
            numeric_id,
            given_name,
            preferred_given_name: None,
            family_name,
            preferred_family_name: None,
            access_level: AccessLevel::User,
            pronouns,
            courses: BTreeMap::new(),
        })
    }

    /// Draws names until one yields an unused id.
    fn draw_identity(
        &mut self,
        existing_ids: &BTreeSet<String>,
    ) -> Result<(String, String, String), GenerationError> {
        for _ in 0..self.max_name_attempts {
            let given: String = FirstName(EN).fake_with_rng(&mut self.rng);
            let family: String = LastName(EN).fake_with_rng(&mut self.rng);

            if let Some(user_id) = self.derive_user_id(&given, &family, existing_ids) {
                return Ok((given, family, user_id));
            }
        }

        Err(GenerationError::IdSpaceExhausted {
            max_attempts: self.max_name_attempts,
        })
    }

    /// Derives `<family fragment><given initial>`, appending the smallest free
    /// numeric suffix on collision.
    fn derive_user_id(
        &self,
        given: &str,
        family: &str,
        existing_ids: &BTreeSet<String>,
    ) -> Option<String> {
        let base = format!(
            "{}{}",
            id_fragment(family, FAMILY_FRAGMENT_LEN),
            id_fragment(given, 1)
        );
        if base.is_empty() {
            return None;
        }

        (0..=self.max_id_suffix)
            .map(|suffix| {
                if suffix == 0 {
                    base.clone()
                } else {
                    format!("{base}{suffix}")
                }
            })
            .find(|candidate| is_valid_user_id(candidate) && !self.is_taken(candidate, existing_ids))
    }

    fn is_taken(&self, candidate: &str, existing_ids: &BTreeSet<String>) -> bool {
        existing_ids.contains(candidate)
            || self.issued_ids.contains(candidate)
            || self.context.is_excluded(candidate)
    }

    fn draw_numeric_id(&mut self) -> Result<u32, GenerationError> {
        for _ in 0..MAX_NUMERIC_ATTEMPTS {
            let candidate = self.rng.random_range(NUMERIC_ID_RANGE);
            if !self.issued_numeric_ids.contains(&candidate) {
                return Ok(candidate);
            }
        }

        Err(GenerationError::NumericIdSpaceExhausted {
            max_attempts: MAX_NUMERIC_ATTEMPTS,
        })
    }
}
