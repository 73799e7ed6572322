//! Port abstraction for persisting provisioned users, terms and courses.

use crate::domain::records::{CourseRecord, TermRow, UserRow};

use super::define_port_error;

define_port_error! {
    /// Errors raised by persistence sink adapters.
    pub enum PersistenceError {
        /// The store could not be opened.
        Connection { message: String } => "persistence store unavailable: {message}",
        /// Rows could not be encoded for the store.
        Encode { table: String, message: String } => "failed to encode {table} rows: {message}",
        /// Rows could not be written.
        Write { table: String, message: String } => "failed to write {table} rows: {message}",
    }
}

/// Port for inserting provisioned rows.
///
/// The orchestrator calls `insert_users` and `insert_term` once each, before
/// any course is allocated, then `insert_course` once per course in code
/// order. There is no rollback: rows written before a failure stay written.
#[cfg_attr(test, mockall::automock)]
pub trait PersistenceSink {
    /// Inserts user rows, already sorted by user id.
    fn insert_users(&self, rows: &[UserRow]) -> Result<(), PersistenceError>;

    /// Inserts the term row.
    fn insert_term(&self, row: &TermRow) -> Result<(), PersistenceError>;

    /// Inserts a course with its membership rows.
    fn insert_course(&self, record: &CourseRecord) -> Result<(), PersistenceError>;
}
