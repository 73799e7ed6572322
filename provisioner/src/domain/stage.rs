//! Provisioning stages and the error reported when a stage fails.

use std::fmt;

use sample_roster::{AllocationError, DefinitionError, TermError};
use thiserror::Error;

use super::ports::{
    AccountProvisionerError, DaemonControlError, DefinitionSourceError, MaterializerError,
    PersistenceError, RegradeTriggerError,
};
use super::records::RecordError;

/// Strictly ordered stages of a provisioning run.
///
/// A run only ever moves forward; each variant names the last stage that
/// completed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProvisioningStage {
    /// Nothing has completed yet.
    NotStarted,
    /// Grading daemons are stopped.
    DaemonsPaused,
    /// Course and user definitions are parsed and validated.
    DefinitionsLoaded,
    /// Accounts exist for every real user.
    RealUsersCreated,
    /// The synthetic pool is generated and frozen.
    PoolGenerated,
    /// The academic term is known.
    TermComputed,
    /// User and term rows are persisted.
    UsersPersisted,
    /// Every course has its membership and sections.
    CoursesAllocated,
    /// Course rows and structures are persisted.
    CoursesPersisted,
    /// Grading daemons are running again.
    DaemonsResumed,
    /// The regrade job is queued.
    RegradeEnqueued,
}

impl ProvisioningStage {
    /// Returns the stage name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::DaemonsPaused => "daemons-paused",
            Self::DefinitionsLoaded => "definitions-loaded",
            Self::RealUsersCreated => "real-users-created",
            Self::PoolGenerated => "pool-generated",
            Self::TermComputed => "term-computed",
            Self::UsersPersisted => "users-persisted",
            Self::CoursesAllocated => "courses-allocated",
            Self::CoursesPersisted => "courses-persisted",
            Self::DaemonsResumed => "daemons-resumed",
            Self::RegradeEnqueued => "regrade-enqueued",
        }
    }
}

impl fmt::Display for ProvisioningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether grading daemons are known to be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    /// Daemons were never stopped, or were restarted.
    Running,
    /// A stop was issued and no restart followed.
    Paused,
}

impl fmt::Display for DaemonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "daemons running",
            Self::Paused => "daemons remain paused",
        })
    }
}

/// The underlying cause of a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisioningFailure {
    /// Daemons could not be paused or resumed.
    #[error(transparent)]
    DaemonControl(#[from] DaemonControlError),
    /// Definition documents could not be read.
    #[error(transparent)]
    DefinitionSource(#[from] DefinitionSourceError),
    /// A definition is malformed or inconsistent.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// The course filter names a course with no definition.
    #[error("course filter names unknown course '{code}'")]
    UnknownFilteredCourse {
        /// The unknown course code.
        code: String,
    },
    /// An account could not be created.
    #[error(transparent)]
    Account(#[from] AccountProvisionerError),
    /// Pool generation or course allocation failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    /// The term could not be derived.
    #[error(transparent)]
    Term(#[from] TermError),
    /// Rows could not be built.
    #[error(transparent)]
    Record(#[from] RecordError),
    /// Rows could not be persisted.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// A course structure could not be built.
    #[error(transparent)]
    Materialization(#[from] MaterializerError),
    /// The regrade job could not be queued.
    #[error(transparent)]
    Regrade(#[from] RegradeTriggerError),
}

/// A failed provisioning run.
///
/// Carries the last completed stage and the daemon state so operators know
/// whether the grading daemons need a manual restart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provisioning failed after stage {completed} ({daemons}): {failure}")]
pub struct ProvisioningError {
    /// Last stage that completed successfully.
    pub completed: ProvisioningStage,
    /// Daemon state at the time of failure.
    pub daemons: DaemonState,
    /// Underlying cause.
    #[source]
    pub failure: ProvisioningFailure,
}

impl ProvisioningError {
    /// Returns `true` when the daemons were left stopped.
    #[must_use]
    pub const fn daemons_paused(&self) -> bool {
        matches!(self.daemons, DaemonState::Paused)
    }
}
