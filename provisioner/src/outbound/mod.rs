//! Outbound adapters implementing the provisioning ports.
//!
//! - **yaml_definitions**: definition documents read from an install directory
//! - **snapshot_sink**: JSON snapshots standing in for the platform database
//! - **course_directories**: per-course directory trees and roster files
//! - **systemctl**: grading daemon control through service units
//! - **regrade_queue**: regrade jobs dropped into a polled queue directory
//! - **dry_run**: logging-only account and daemon adapters
//!
//! Adapters translate between domain records and files or processes. They
//! contain no roster logic.

mod atomic_io;
pub mod course_directories;
pub mod dry_run;
pub mod regrade_queue;
pub mod snapshot_sink;
pub mod systemctl;
pub mod yaml_definitions;

pub use course_directories::CourseDirectoryMaterializer;
pub use dry_run::{DryRunAccountProvisioner, DryRunDaemonController};
pub use regrade_queue::QueueRegradeTrigger;
pub use snapshot_sink::JsonSnapshotSink;
pub use systemctl::SystemctlDaemonController;
pub use yaml_definitions::YamlDefinitionSource;
