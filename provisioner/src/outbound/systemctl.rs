//! Daemon controller backed by `systemctl`.

use std::ffi::OsString;
use std::process::Command;

use crate::domain::ports::{DaemonControlError, DaemonController};

/// Stops and starts grading daemons through `systemctl`.
///
/// Units are stopped in configured order on `pause` and started in the same
/// order on `resume`. The first failing unit aborts the operation.
#[derive(Debug, Clone)]
pub struct SystemctlDaemonController {
    program: OsString,
    units: Vec<String>,
}

impl SystemctlDaemonController {
    /// Builds a controller for `units`.
    #[must_use]
    pub fn new(units: Vec<String>) -> Self {
        Self {
            program: OsString::from("systemctl"),
            units,
        }
    }

    /// Replaces the control program, keeping `<action> <unit>` arguments.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Returns the managed units.
    #[must_use]
    pub fn units(&self) -> &[String] {
        &self.units
    }

    fn command(&self, action: &str, unit: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(action).arg(unit);
        command
    }

    fn run_all(&self, action: &str) -> Result<(), DaemonControlError> {
        for unit in &self.units {
            let output = self
                .command(action, unit)
                .output()
                .map_err(|err| DaemonControlError::command(unit.as_str(), err.to_string()))?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
                let status = if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    format!("{}: {stderr}", output.status)
                };
                return Err(DaemonControlError::status(unit.as_str(), action, status));
            }
            tracing::info!(unit = %unit, action, "daemon control succeeded");
        }
        Ok(())
    }
}

impl DaemonController for SystemctlDaemonController {
    fn pause(&self) -> Result<(), DaemonControlError> {
        self.run_all("stop")
    }

    fn resume(&self) -> Result<(), DaemonControlError> {
        self.run_all("start")
    }
}
