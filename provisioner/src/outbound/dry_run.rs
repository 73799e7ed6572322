//! Adapters that only log what they would do.
//!
//! Used for local runs where creating system accounts or touching service
//! units is not wanted.

use sample_roster::User;

use crate::domain::ports::{
    AccountProvisioner, AccountProvisionerError, DaemonControlError, DaemonController,
};

/// Logs each account request instead of creating a system account.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunAccountProvisioner;

impl AccountProvisioner for DryRunAccountProvisioner {
    fn create_account(&self, user: &User) -> Result<(), AccountProvisionerError> {
        tracing::info!(
            user_id = %user.user_id,
            access_level = ?user.access_level,
            courses = user.courses.len(),
            "account creation recorded (dry run)"
        );
        Ok(())
    }
}

/// Logs pause and resume requests for the configured units.
#[derive(Debug, Clone, Default)]
pub struct DryRunDaemonController {
    units: Vec<String>,
}

impl DryRunDaemonController {
    /// Builds a controller that reports on `units`.
    #[must_use]
    pub const fn new(units: Vec<String>) -> Self {
        Self { units }
    }
}

impl DaemonController for DryRunDaemonController {
    fn pause(&self) -> Result<(), DaemonControlError> {
        tracing::info!(units = ?self.units, "daemon stop recorded (dry run)");
        Ok(())
    }

    fn resume(&self) -> Result<(), DaemonControlError> {
        tracing::info!(units = ?self.units, "daemon start recorded (dry run)");
        Ok(())
    }
}
