//! Run-wide roster context.
//!
//! The context carries everything that used to be process-wide state in
//! sample data tooling: the generator seed and the set of account ids that
//! belong to platform services. It is built once and passed to the pool
//! generator and the orchestrator.

use std::collections::BTreeSet;

/// Seed used when no override is configured.
///
/// Hand-authored fixture data is keyed to the rosters this seed produces, so
/// changing it invalidates those fixtures.
pub const DEFAULT_SEED: u64 = 10_090_542;

/// Service account ids provisioned outside this tool.
pub const DEFAULT_EXCLUDED_USER_IDS: [&str; 6] = [
    "submitty_php",
    "submitty_daemon",
    "submitty_cgi",
    "submitty_dbuser",
    "vagrant",
    "postgres",
];

/// Prefix reserved for sandboxed grading accounts.
pub const DEFAULT_RESERVED_PREFIX: &str = "untrusted";

/// Explicit configuration for a provisioning run.
///
/// # Example
///
/// ```
/// use sample_roster::RosterContext;
///
/// let context = RosterContext::new(42);
/// assert_eq!(context.seed(), 42);
/// assert!(context.is_excluded("submitty_daemon"));
/// assert!(context.is_excluded("untrusted07"));
/// assert!(!context.is_excluded("instructor"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterContext {
    seed: u64,
    excluded_user_ids: BTreeSet<String>,
    reserved_prefix: String,
}

impl RosterContext {
    /// Creates a context with the default service-account denylist.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            excluded_user_ids: DEFAULT_EXCLUDED_USER_IDS
                .iter()
                .map(|id| (*id).to_owned())
                .collect(),
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_owned(),
        }
    }

    /// Replaces the service-account denylist.
    #[must_use]
    pub fn with_excluded_user_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_user_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the reserved account prefix.
    #[must_use]
    pub fn with_reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reserved_prefix = prefix.into();
        self
    }

    /// Returns the generator seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the service-account denylist.
    #[must_use]
    pub const fn excluded_user_ids(&self) -> &BTreeSet<String> {
        &self.excluded_user_ids
    }

    /// Returns the reserved account prefix.
    #[must_use]
    pub fn reserved_prefix(&self) -> &str {
        &self.reserved_prefix
    }

    /// Returns `true` when the id belongs to an externally provisioned account.
    #[must_use]
    pub fn is_excluded(&self, user_id: &str) -> bool {
        self.excluded_user_ids.contains(user_id)
            || (!self.reserved_prefix.is_empty() && user_id.starts_with(&self.reserved_prefix))
    }
}

impl Default for RosterContext {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn default_context_uses_fixed_seed() {
        assert_eq!(RosterContext::default().seed(), 10_090_542);
    }

    #[rstest]
    #[case("submitty_php", true)]
    #[case("postgres", true)]
    #[case("untrusted00", true)]
    #[case("untrusted", true)]
    #[case("instructor", false)]
    #[case("trusted", false)]
    fn default_denylist_and_prefix(#[case] user_id: &str, #[case] expected: bool) {
        assert_eq!(RosterContext::default().is_excluded(user_id), expected);
    }

    #[test]
    fn overrides_replace_defaults() {
        let context = RosterContext::new(1)
            .with_excluded_user_ids(["svc"])
            .with_reserved_prefix("");

        assert!(context.is_excluded("svc"));
        assert!(!context.is_excluded("postgres"));
        assert!(!context.is_excluded("untrusted00"));
    }
}
