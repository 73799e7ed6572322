//! Shared wiring for provisioning integration tests.

use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use roster_provisioner::domain::{
    ProvisionOptions, Provisioner, ProvisioningError, ProvisioningReport,
};
use roster_provisioner::outbound::YamlDefinitionSource;
use roster_provisioner::test_support::{FixedClock, RecordingCollaborators};
use sample_roster::RosterContext;

/// Directory holding the bundled sample definitions.
pub fn fixture_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("sample-data")
}

/// Fixed run date inside the spring term.
pub fn spring_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date")
}

/// Result of one run against recording collaborators.
pub struct RecordedRun {
    pub collaborators: Arc<RecordingCollaborators>,
    pub outcome: Result<ProvisioningReport, ProvisioningError>,
}

/// Runs the bundled definitions against fresh recording collaborators.
pub fn run_recorded(
    options: ProvisionOptions,
    prepare: impl FnOnce(&RecordingCollaborators),
) -> RecordedRun {
    let collaborators = RecordingCollaborators::new();
    prepare(&collaborators);
    let definitions = YamlDefinitionSource::open(&fixture_dir()).expect("fixture definitions");
    let provisioner = Provisioner::new(
        collaborators.ports(Arc::new(definitions)),
        Arc::new(FixedClock::on(spring_date())),
        RosterContext::default(),
        options,
    );
    let outcome = provisioner.run();
    RecordedRun {
        collaborators,
        outcome,
    }
}
