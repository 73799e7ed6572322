//! Regrade trigger that drops a job file into a queue directory.
//!
//! The grading scheduler polls `<data_dir>/regrade_queue` and regrades every
//! course listed in each job it finds.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::Dir;

use super::atomic_io::write_atomic;
use crate::domain::ports::{RegradeRequest, RegradeTrigger, RegradeTriggerError};

const QUEUE_DIR: &str = "regrade_queue";

/// Writes `regrade_<term>.json` jobs into the queue directory.
#[derive(Debug)]
pub struct QueueRegradeTrigger {
    queue: Dir,
}

impl QueueRegradeTrigger {
    /// Opens `<data_dir>/regrade_queue`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RegradeTriggerError::Enqueue`] when the queue directory
    /// cannot be opened or created.
    pub fn open(data_dir: &Utf8Path) -> Result<Self, RegradeTriggerError> {
        let enqueue = |err: std::io::Error| {
            RegradeTriggerError::enqueue(format!("{}: {err}", data_dir.join(QUEUE_DIR)))
        };
        let root = Dir::open_ambient_dir(data_dir, ambient_authority()).map_err(enqueue)?;
        root.create_dir_all(QUEUE_DIR).map_err(enqueue)?;
        let queue = root.open_dir(QUEUE_DIR).map_err(enqueue)?;
        Ok(Self { queue })
    }

    /// Returns the job file name for a term.
    #[must_use]
    pub fn job_file_name(term_id: &str) -> String {
        format!("regrade_{term_id}.json")
    }
}

impl RegradeTrigger for QueueRegradeTrigger {
    fn enqueue(&self, request: &RegradeRequest) -> Result<(), RegradeTriggerError> {
        let job = serde_json::to_vec_pretty(request)
            .map_err(|err| RegradeTriggerError::enqueue(err.to_string()))?;
        let file_name = Self::job_file_name(&request.term_id);
        write_atomic(&self.queue, Utf8Path::new(&file_name), &job)
            .map_err(|err| RegradeTriggerError::enqueue(format!("{file_name}: {err}")))?;
        tracing::info!(
            term = %request.term_id,
            courses = request.course_codes.len(),
            job = %file_name,
            "regrade queued"
        );
        Ok(())
    }
}
