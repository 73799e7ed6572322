//! Persistence sink writing JSON snapshots of provisioned rows.
//!
//! Each insert replaces one file under `<data_dir>/snapshot`: `users.json`,
//! `terms.json` and one `course-<code>.json` per course. Files are written
//! atomically so a failed run never leaves a truncated snapshot.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Serialize;

use super::atomic_io::write_atomic;
use crate::domain::ports::{PersistenceError, PersistenceSink};
use crate::domain::{CourseRecord, TermRow, UserRow};

const SNAPSHOT_DIR: &str = "snapshot";
const USERS_FILE: &str = "users.json";
const TERMS_FILE: &str = "terms.json";

/// JSON file snapshot store.
#[derive(Debug)]
pub struct JsonSnapshotSink {
    dir: Dir,
}

impl JsonSnapshotSink {
    /// Opens `<data_dir>/snapshot`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Connection`] when the data directory is
    /// missing or the snapshot folder cannot be created.
    pub fn open(data_dir: &Utf8Path) -> Result<Self, PersistenceError> {
        let connection = |err: std::io::Error| {
            PersistenceError::connection(format!("{}: {err}", data_dir.join(SNAPSHOT_DIR)))
        };
        let root = Dir::open_ambient_dir(data_dir, ambient_authority()).map_err(connection)?;
        root.create_dir_all(SNAPSHOT_DIR).map_err(connection)?;
        let dir = root.open_dir(SNAPSHOT_DIR).map_err(connection)?;
        Ok(Self { dir })
    }

    /// Returns the snapshot file name used for a course.
    #[must_use]
    pub fn course_file_name(code: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("course-{code}.json"))
    }

    fn write_table<T: Serialize + ?Sized>(
        &self,
        table: &str,
        file_name: &Utf8Path,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let mut encoded = serde_json::to_vec_pretty(value)
            .map_err(|err| PersistenceError::encode(table, err.to_string()))?;
        encoded.push(b'\n');
        write_atomic(&self.dir, file_name, &encoded)
            .map_err(|err| PersistenceError::write(table, format!("{file_name}: {err}")))?;
        tracing::debug!(table, file = %file_name, "snapshot written");
        Ok(())
    }
}

impl PersistenceSink for JsonSnapshotSink {
    fn insert_users(&self, rows: &[UserRow]) -> Result<(), PersistenceError> {
        self.write_table("users", Utf8Path::new(USERS_FILE), rows)
    }

    fn insert_term(&self, row: &TermRow) -> Result<(), PersistenceError> {
        self.write_table("terms", Utf8Path::new(TERMS_FILE), std::slice::from_ref(row))
    }

    fn insert_course(&self, record: &CourseRecord) -> Result<(), PersistenceError> {
        self.write_table("courses", &Self::course_file_name(&record.code), record)
    }
}
