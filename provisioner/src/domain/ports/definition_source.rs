//! Port abstraction for reading course and user definition documents.
//!
//! Adapters only locate and read documents; parsing and validation happen in
//! the roster library so every source yields identically validated records.

use super::define_port_error;

define_port_error! {
    /// Errors raised by definition source adapters.
    pub enum DefinitionSourceError {
        /// A required definition directory does not exist.
        MissingDirectory { path: String } => "definition directory does not exist: {path}",
        /// A definition document could not be read.
        Read { path: String, message: String } => "failed to read definition {path}: {message}",
    }
}

/// One raw definition document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionDocument {
    /// Document name used in error messages, typically the file name.
    pub name: String,
    /// Raw YAML contents.
    pub contents: String,
}

impl DefinitionDocument {
    /// Creates a document from a name and its contents.
    #[must_use]
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Port for enumerating definition documents.
///
/// Implementations must return documents sorted by name so that definition
/// order, and therefore every derived roster, is stable across hosts.
#[cfg_attr(test, mockall::automock)]
pub trait DefinitionSource {
    /// Returns every course definition document.
    fn course_documents(&self) -> Result<Vec<DefinitionDocument>, DefinitionSourceError>;

    /// Returns every user definition document.
    fn user_documents(&self) -> Result<Vec<DefinitionDocument>, DefinitionSourceError>;
}
