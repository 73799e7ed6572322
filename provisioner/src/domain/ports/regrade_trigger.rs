//! Port abstraction for queueing a regrade of freshly provisioned courses.

use serde::Serialize;

use super::define_port_error;

define_port_error! {
    /// Errors raised by regrade trigger adapters.
    pub enum RegradeTriggerError {
        /// The regrade job could not be queued.
        Enqueue { message: String } => "failed to queue regrade: {message}",
    }
}

/// Regrade job covering every provisioned course of one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegradeRequest {
    /// Term whose course directories should be regraded.
    pub term_id: String,
    /// Provisioned course codes in code order.
    pub course_codes: Vec<String>,
}

/// Port for queueing the final regrade.
#[cfg_attr(test, mockall::automock)]
pub trait RegradeTrigger {
    /// Queues one regrade job.
    fn enqueue(&self, request: &RegradeRequest) -> Result<(), RegradeTriggerError>;
}
