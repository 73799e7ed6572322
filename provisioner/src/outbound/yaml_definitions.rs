//! Definition source backed by YAML files on disk.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::domain::ports::{DefinitionDocument, DefinitionSource, DefinitionSourceError};

const COURSES_DIR: &str = "courses";
const USERS_DIR: &str = "users";
const DEFINITION_EXTENSION: &str = "yml";

/// Reads `courses/*.yml` and `users/*.yml` from an install directory.
///
/// Documents are returned sorted by file name and named `<folder>/<file>` so
/// parse errors point at the offending file.
#[derive(Debug)]
pub struct YamlDefinitionSource {
    root: Dir,
    root_path: Utf8PathBuf,
}

impl YamlDefinitionSource {
    /// Opens the install directory and checks both definition folders exist.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionSourceError::MissingDirectory`] when the install
    /// directory or either folder is absent.
    pub fn open(install_dir: &Utf8Path) -> Result<Self, DefinitionSourceError> {
        let root = Dir::open_ambient_dir(install_dir, ambient_authority())
            .map_err(|_| DefinitionSourceError::missing_directory(install_dir.as_str()))?;
        for folder in [COURSES_DIR, USERS_DIR] {
            if !root.is_dir(folder) {
                return Err(DefinitionSourceError::missing_directory(
                    install_dir.join(folder).as_str(),
                ));
            }
        }
        Ok(Self {
            root,
            root_path: install_dir.to_owned(),
        })
    }

    fn read_folder(&self, folder: &str) -> Result<Vec<DefinitionDocument>, DefinitionSourceError> {
        let folder_path = self.root_path.join(folder);
        let read_err =
            |err: io::Error| DefinitionSourceError::read(folder_path.as_str(), err.to_string());
        let dir = self.root.open_dir(folder).map_err(read_err)?;

        let mut names = Vec::new();
        for entry in dir.entries().map_err(read_err)? {
            let dir_entry = entry.map_err(read_err)?;
            let Ok(name) = dir_entry.file_name().into_string() else {
                continue;
            };
            let is_definition = Utf8Path::new(&name).extension() == Some(DEFINITION_EXTENSION);
            if is_definition && dir_entry.file_type().map_err(read_err)?.is_file() {
                names.push(name);
            }
        }
        names.sort();

        names
            .into_iter()
            .map(|name| {
                let document_name = format!("{folder}/{name}");
                let contents = dir.read_to_string(&name).map_err(|err| {
                    DefinitionSourceError::read(document_name.as_str(), err.to_string())
                })?;
                Ok(DefinitionDocument::new(document_name, contents))
            })
            .collect()
    }
}

impl DefinitionSource for YamlDefinitionSource {
    fn course_documents(&self) -> Result<Vec<DefinitionDocument>, DefinitionSourceError> {
        self.read_folder(COURSES_DIR)
    }

    fn user_documents(&self) -> Result<Vec<DefinitionDocument>, DefinitionSourceError> {
        self.read_folder(USERS_DIR)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    struct InstallDir {
        _tmp: TempDir,
        path: Utf8PathBuf,
        dir: Dir,
    }

    #[fixture]
    fn install_dir() -> InstallDir {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 temp path");
        let dir = Dir::open_ambient_dir(&path, ambient_authority()).expect("open temp dir");
        dir.create_dir(COURSES_DIR).expect("create courses");
        dir.create_dir(USERS_DIR).expect("create users");
        InstallDir {
            _tmp: tmp,
            path,
            dir,
        }
    }

    #[rstest]
    fn documents_are_sorted_and_filtered(install_dir: InstallDir) {
        let courses = install_dir.dir.open_dir(COURSES_DIR).expect("open courses");
        courses.write("tutorial.yml", "code: tutorial").expect("write");
        courses.write("sample.yml", "code: sample").expect("write");
        courses.write("notes.txt", "ignored").expect("write");
        courses.create_dir("archive.yml").expect("create dir");

        let source = YamlDefinitionSource::open(&install_dir.path).expect("open source");
        let documents = source.course_documents().expect("read courses");

        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["courses/sample.yml", "courses/tutorial.yml"]);
        assert_eq!(
            documents.first().map(|d| d.contents.as_str()),
            Some("code: sample")
        );
        assert!(source.user_documents().expect("read users").is_empty());
    }

    #[rstest]
    fn missing_users_folder_is_reported(install_dir: InstallDir) {
        install_dir.dir.remove_dir(USERS_DIR).expect("remove users");

        let err = YamlDefinitionSource::open(&install_dir.path).expect_err("missing folder");
        assert_eq!(
            err,
            DefinitionSourceError::missing_directory(install_dir.path.join(USERS_DIR).as_str())
        );
    }

    #[rstest]
    fn missing_install_dir_is_reported(install_dir: InstallDir) {
        let absent = install_dir.path.join("absent");
        let err = YamlDefinitionSource::open(&absent).expect_err("missing root");
        assert_eq!(err, DefinitionSourceError::missing_directory(absent.as_str()));
    }
}
