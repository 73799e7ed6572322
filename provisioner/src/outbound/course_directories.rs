//! Course materializer building per-course directory trees.
//!
//! Layout under the data directory:
//!
//! ```text
//! courses/<term>/<code>/
//!     config/roster.json
//!     config/config.json      (only when regeneration is requested)
//!     reports/ results/ uploads/
//!     submissions/<student>/  (unless submissions are skipped)
//! ```

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Serialize;

use super::atomic_io::write_atomic;
use crate::domain::CourseRecord;
use crate::domain::ports::{CourseMaterializer, MaterializeRequest, MaterializerError};

const COURSES_DIR: &str = "courses";
const CONFIG_DIR: &str = "config";
const SUBMISSIONS_DIR: &str = "submissions";
const COURSE_FOLDERS: [&str; 5] = [CONFIG_DIR, "reports", "results", SUBMISSIONS_DIR, "uploads"];
const ROSTER_FILE: &str = "roster.json";
const CONFIG_FILE: &str = "config.json";

/// Course settings written to `config/config.json`.
#[derive(Debug, Serialize)]
struct CourseConfig<'a> {
    course: &'a str,
    term: &'a str,
    instructor: &'a str,
    registration_sections: u32,
    rotating_sections: u32,
}

impl<'a> From<&'a CourseRecord> for CourseConfig<'a> {
    fn from(record: &'a CourseRecord) -> Self {
        Self {
            course: &record.code,
            term: &record.term_id,
            instructor: &record.instructor_id,
            registration_sections: record.registration_sections,
            rotating_sections: record.rotating_sections,
        }
    }
}

/// Builds course directory trees beneath `<data_dir>/courses`.
#[derive(Debug)]
pub struct CourseDirectoryMaterializer {
    root: Dir,
}

impl CourseDirectoryMaterializer {
    /// Opens the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when the data directory cannot be opened.
    pub fn open(data_dir: &Utf8Path) -> io::Result<Self> {
        let root = Dir::open_ambient_dir(data_dir, ambient_authority())?;
        Ok(Self { root })
    }

    /// Returns the course directory path relative to the data directory.
    #[must_use]
    pub fn course_path(term_id: &str, code: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(COURSES_DIR).join(term_id).join(code)
    }
}

impl CourseMaterializer for CourseDirectoryMaterializer {
    fn materialize(&self, request: &MaterializeRequest) -> Result<(), MaterializerError> {
        let record = &request.course;
        let course_path = Self::course_path(&record.term_id, &record.code);

        for folder in COURSE_FOLDERS {
            let folder_path = course_path.join(folder);
            self.root
                .create_dir_all(&folder_path)
                .map_err(filesystem_error(&record.code, &folder_path))?;
        }
        let config_path = course_path.join(CONFIG_DIR);
        let config_dir = self
            .root
            .open_dir(&config_path)
            .map_err(filesystem_error(&record.code, &config_path))?;

        write_json(&config_dir, ROSTER_FILE, record, &config_path, &record.code)?;
        if request.regenerate_config {
            let config = CourseConfig::from(record);
            write_json(&config_dir, CONFIG_FILE, &config, &config_path, &record.code)?;
        }

        let mut submission_folders = 0_usize;
        if request.include_submissions {
            for student in record.student_ids() {
                let student_path = course_path.join(SUBMISSIONS_DIR).join(student);
                self.root
                    .create_dir_all(&student_path)
                    .map_err(filesystem_error(&record.code, &student_path))?;
                submission_folders = submission_folders.saturating_add(1);
            }
        }

        tracing::info!(
            course = %record.code,
            path = %course_path,
            submission_folders,
            regenerated_config = request.regenerate_config,
            "course materialized"
        );
        Ok(())
    }
}

fn filesystem_error(
    course: &str,
    path: &Utf8Path,
) -> impl FnOnce(io::Error) -> MaterializerError + use<> {
    let course_code = course.to_owned();
    let path_text = path.to_string();
    move |err| MaterializerError::filesystem(course_code, path_text, err.to_string())
}

fn write_json<T: Serialize>(
    dir: &Dir,
    file_name: &str,
    value: &T,
    dir_path: &Utf8Path,
    course: &str,
) -> Result<(), MaterializerError> {
    let mut encoded = serde_json::to_vec_pretty(value)
        .map_err(|err| MaterializerError::encode(course, err.to_string()))?;
    encoded.push(b'\n');
    write_atomic(dir, Utf8Path::new(file_name), &encoded)
        .map_err(filesystem_error(course, &dir_path.join(file_name)))
}
