//! Collaborator ports driven by the provisioning orchestrator.

mod macros;
pub(crate) use macros::define_port_error;

mod account_provisioner;
mod course_materializer;
mod daemon_controller;
mod definition_source;
mod persistence_sink;
mod regrade_trigger;

#[cfg(test)]
pub use account_provisioner::MockAccountProvisioner;
pub use account_provisioner::{AccountProvisioner, AccountProvisionerError};
#[cfg(test)]
pub use course_materializer::MockCourseMaterializer;
pub use course_materializer::{CourseMaterializer, MaterializeRequest, MaterializerError};
#[cfg(test)]
pub use daemon_controller::MockDaemonController;
pub use daemon_controller::{DaemonControlError, DaemonController};
#[cfg(test)]
pub use definition_source::MockDefinitionSource;
pub use definition_source::{DefinitionDocument, DefinitionSource, DefinitionSourceError};
#[cfg(test)]
pub use persistence_sink::MockPersistenceSink;
pub use persistence_sink::{PersistenceError, PersistenceSink};
#[cfg(test)]
pub use regrade_trigger::MockRegradeTrigger;
pub use regrade_trigger::{RegradeRequest, RegradeTrigger, RegradeTriggerError};
