//! Port abstraction for creating platform accounts for defined users.

use sample_roster::User;

use super::define_port_error;

define_port_error! {
    /// Errors raised by account provisioner adapters.
    pub enum AccountProvisionerError {
        /// The account could not be created.
        Creation { user_id: String, message: String } =>
            "failed to create account for {user_id}: {message}",
    }
}

/// Port for creating one operating-system or platform account per real user.
///
/// Only users loaded from definitions reach this port; synthetic students are
/// database-only and never get accounts.
#[cfg_attr(test, mockall::automock)]
pub trait AccountProvisioner {
    /// Creates the account for `user`.
    fn create_account(&self, user: &User) -> Result<(), AccountProvisionerError>;
}
