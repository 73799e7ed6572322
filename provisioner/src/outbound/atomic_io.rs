//! Atomic file writes for the filesystem adapters.
//!
//! Contents go to a hidden temporary file in the target directory, which is
//! then renamed over the target. Readers never observe a partial file.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes `contents` to `file_name` inside `dir` atomically.
///
/// # Errors
///
/// Returns an [`io::Error`] if `file_name` is not a single path component or
/// the temporary file cannot be written or renamed.
pub(crate) fn write_atomic(dir: &Dir, file_name: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let mut components = file_name.components();
    let (Some(Utf8Component::Normal(name)), None) = (components.next(), components.next()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{file_name} must be a plain file name"),
        ));
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{name}.tmp.{}.{counter}", std::process::id());

    if let Err(err) = write_temp_file(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    if let Err(err) = dir.rename(&tmp_name, dir, name) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    sync_directory(dir);
    Ok(())
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn sync_directory(dir: &Dir) {
    // Best-effort; some filesystems refuse directory fsync.
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        tracing::debug!("directory sync skipped");
    }
}
