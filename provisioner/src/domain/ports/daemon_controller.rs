//! Port abstraction for pausing and resuming grading daemons.
//!
//! Grading daemons pick up submission files as soon as they appear, so they
//! are paused for the whole provisioning run and resumed only after every
//! course is persisted.

use super::define_port_error;

define_port_error! {
    /// Errors raised by daemon controller adapters.
    pub enum DaemonControlError {
        /// A daemon could not be launched or signalled.
        Command { unit: String, message: String } => "failed to control daemon {unit}: {message}",
        /// A daemon control command exited unsuccessfully.
        Status { unit: String, action: String, status: String } =>
            "daemon {unit} did not {action}: {status}",
    }
}

/// Port for pausing and resuming the grading daemons.
///
/// The orchestrator calls `pause` once at the start of a run and `resume`
/// once after courses are persisted. `resume` is never called after a
/// failure.
#[cfg_attr(test, mockall::automock)]
pub trait DaemonController {
    /// Stops every managed daemon.
    fn pause(&self) -> Result<(), DaemonControlError>;

    /// Restarts every managed daemon.
    fn resume(&self) -> Result<(), DaemonControlError>;
}
