//! Provisioning domain: collaborator ports, persisted row shapes, run stages
//! and the orchestrator that sequences them.

mod orchestrator;
pub mod ports;
mod records;
mod stage;

pub use orchestrator::{ProvisionOptions, Provisioner, ProvisioningPorts, ProvisioningReport};
pub use records::{
    CourseRecord, LAST_UPDATED_FORMAT, MembershipRow, RecordError, TermRow, UserRow,
    format_last_updated, hash_credential,
};
pub use stage::{DaemonState, ProvisioningError, ProvisioningFailure, ProvisioningStage};
