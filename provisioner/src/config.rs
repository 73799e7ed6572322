//! Provisioning settings loaded via OrthoConfig.

use std::collections::BTreeSet;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use sample_roster::{DEFAULT_SEED, RosterContext};
use serde::Deserialize;

use crate::domain::ProvisionOptions;

const DEFAULT_DATA_DIR: &str = "/var/local/sample-roster";

/// Grading daemons paused for the duration of a run.
pub const DEFAULT_DAEMON_SERVICES: [&str; 4] = [
    "autograding_shipper",
    "autograding_worker",
    "daemon_jobs_handler",
    "websocket_server",
];

fn default_install_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("sample-data")
}

/// Configuration values controlling a provisioning run.
///
/// Every field can be set from the command line, from `SAMPLE_ROSTER_*`
/// environment variables or from a configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SAMPLE_ROSTER")]
pub struct ProvisionSettings {
    /// Directory holding the `courses/` and `users/` definition folders.
    pub install_dir: Option<PathBuf>,
    /// Directory receiving snapshots, course trees and the regrade queue.
    pub data_dir: Option<PathBuf>,
    /// Overrides the generator seed.
    pub seed: Option<u64>,
    /// Course codes to provision; empty means every course.
    ///
    /// Command-line items may themselves be comma-separated.
    #[serde(default)]
    #[ortho_config(merge_strategy = "append")]
    pub courses: Vec<String>,
    /// Daemon units to pause and resume.
    #[serde(default)]
    #[ortho_config(merge_strategy = "append")]
    pub daemon_services: Vec<String>,
    /// Persist rows only and skip course directories.
    #[ortho_config(default = false)]
    pub db_only: bool,
    /// Skip per-student submission directories.
    #[ortho_config(default = false)]
    pub no_submissions: bool,
    /// Skip the final regrade.
    #[ortho_config(default = false)]
    pub no_grading: bool,
    /// Stop and restart daemons through systemctl instead of logging only.
    #[ortho_config(default = false)]
    pub manage_daemons: bool,
}

impl ProvisionSettings {
    /// Return the definition directory, falling back to the bundled fixtures.
    #[must_use]
    pub fn install_dir(&self) -> PathBuf {
        self.install_dir.clone().unwrap_or_else(default_install_dir)
    }

    /// Return the output directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Return the configured seed, falling back to [`DEFAULT_SEED`].
    #[must_use]
    pub const fn seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => DEFAULT_SEED,
        }
    }

    /// Return the course filter; empty means every course.
    #[must_use]
    pub fn course_filter(&self) -> BTreeSet<String> {
        self.courses
            .iter()
            .flat_map(|item| split_list(item))
            .collect()
    }

    /// Return the daemon units to control.
    #[must_use]
    pub fn daemon_services(&self) -> Vec<String> {
        let units: Vec<String> = self
            .daemon_services
            .iter()
            .flat_map(|item| split_list(item))
            .collect();
        if units.is_empty() {
            DEFAULT_DAEMON_SERVICES.iter().map(|s| (*s).to_owned()).collect()
        } else {
            units
        }
    }

    /// Build orchestrator options from the settings.
    #[must_use]
    pub fn options(&self) -> ProvisionOptions {
        ProvisionOptions {
            course_filter: self.course_filter(),
            db_only: self.db_only,
            no_submissions: self.no_submissions,
            no_grading: self.no_grading,
        }
    }

    /// Build the roster context from the settings.
    #[must_use]
    pub fn context(&self) -> RosterContext {
        RosterContext::new(self.seed())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    //! Unit tests for provisioning settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "SAMPLE_ROSTER_INSTALL_DIR",
        "SAMPLE_ROSTER_DATA_DIR",
        "SAMPLE_ROSTER_SEED",
        "SAMPLE_ROSTER_COURSES",
        "SAMPLE_ROSTER_DAEMON_SERVICES",
        "SAMPLE_ROSTER_DB_ONLY",
        "SAMPLE_ROSTER_NO_SUBMISSIONS",
        "SAMPLE_ROSTER_NO_GRADING",
        "SAMPLE_ROSTER_MANAGE_DAEMONS",
    ];

    fn load_from_empty_args() -> ProvisionSettings {
        ProvisionSettings::load_from_iter([OsString::from("provision-sample-courses")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.install_dir(), default_install_dir());
        assert_eq!(settings.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(settings.seed(), DEFAULT_SEED);
        assert!(settings.course_filter().is_empty());
        assert_eq!(settings.daemon_services(), DEFAULT_DAEMON_SERVICES);
        assert_eq!(settings.options(), ProvisionOptions::default());
        assert!(!settings.manage_daemons);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SAMPLE_ROSTER_INSTALL_DIR", Some("/srv/sample".to_owned())),
            ("SAMPLE_ROSTER_DATA_DIR", Some("/tmp/roster".to_owned())),
            ("SAMPLE_ROSTER_SEED", Some("42".to_owned())),
            ("SAMPLE_ROSTER_COURSES", Some("tutorial,sample".to_owned())),
            (
                "SAMPLE_ROSTER_DAEMON_SERVICES",
                Some("websocket_server,autograding_worker".to_owned()),
            ),
            ("SAMPLE_ROSTER_DB_ONLY", Some("true".to_owned())),
            ("SAMPLE_ROSTER_NO_SUBMISSIONS", None::<String>),
            ("SAMPLE_ROSTER_NO_GRADING", Some("true".to_owned())),
            ("SAMPLE_ROSTER_MANAGE_DAEMONS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.install_dir(), PathBuf::from("/srv/sample"));
        assert_eq!(settings.data_dir(), PathBuf::from("/tmp/roster"));
        assert_eq!(settings.context().seed(), 42);
        assert_eq!(
            settings.daemon_services(),
            ["websocket_server", "autograding_worker"]
        );

        let options = settings.options();
        assert_eq!(
            options.course_filter.into_iter().collect::<Vec<_>>(),
            ["sample", "tutorial"]
        );
        assert!(options.db_only);
        assert!(!options.no_submissions);
        assert!(options.no_grading);
    }

    #[rstest]
    fn comma_separated_command_line_items_are_split() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = ProvisionSettings::load_from_iter(
            ["provision-sample-courses", "--courses", "tutorial, sample"].map(OsString::from),
        )
        .expect("config should load");
        assert_eq!(
            settings.course_filter().into_iter().collect::<Vec<_>>(),
            ["sample", "tutorial"]
        );
    }

    #[rstest]
    #[case("", &[])]
    #[case("a", &["a"])]
    #[case(" a , ,b ", &["a", "b"])]
    fn split_list_trims_and_drops_empty_items(#[case] raw: &str, #[case] expected: &[&str]) {
        assert_eq!(split_list(raw), expected);
    }
}
