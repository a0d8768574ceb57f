use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::NamedTempFile;
use thiserror::Error;

/// Mode of every exported file; temp files start out owner-only.
#[cfg(unix)]
const EXPORTED_FILE_MODE: u32 = 0o644;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("invalid output path: {0:?}")]
    InvalidPath(PathBuf),
    #[error("failed to stamp modification time on {path:?}: {source}")]
    Timestamp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// What the output writer did with a destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Same timestamp and same bytes as the previous export.
    Unchanged,
    /// The destination is newer than the note; it was edited after the last export.
    SkippedUserModified,
}

impl WriteOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteOutcome::Written => "written",
            WriteOutcome::Unchanged => "unchanged",
            WriteOutcome::SkippedUserModified => "skipped_user_modified",
        }
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!("{dir:?} is not a directory")));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        publish_permissions(&tmp)?;

        // Replace existing file if present; rename over it is not portable.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

#[cfg(unix)]
fn publish_permissions(tmp: &NamedTempFile) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(EXPORTED_FILE_MODE))
}

#[cfg(not(unix))]
fn publish_permissions(_tmp: &NamedTempFile) -> io::Result<()> {
    Ok(())
}

/// Writes `content` to `path` unless the destination was modified after the
/// previous export, then stamps it with `source_time`.
///
/// The write happens when the destination is missing or `source_time` is not
/// older than its last-write time; identical bytes with an identical
/// timestamp are left untouched.
pub fn write_if_unmodified(
    path: &Path,
    content: &str,
    source_time: SystemTime,
) -> Result<WriteOutcome, PersistError> {
    match fs::metadata(path) {
        Ok(meta) => {
            let dest_time = meta.modified()?;
            if source_time < dest_time {
                return Ok(WriteOutcome::SkippedUserModified);
            }
            if source_time == dest_time && fs::read(path)? == content.as_bytes() {
                return Ok(WriteOutcome::Unchanged);
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    let (dir, filename) = split_path(path)?;
    let target = AtomicFileWriter::new(dir).write(&filename, content)?;
    stamp_modified(&target, source_time)?;
    Ok(WriteOutcome::Written)
}

/// Sets the last-write time of `path`.
pub fn stamp_modified(path: &Path, time: SystemTime) -> Result<(), PersistError> {
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(time))
        .map_err(|source| PersistError::Timestamp {
            path: path.to_path_buf(),
            source,
        })
}

fn split_path(path: &Path) -> Result<(PathBuf, String), PersistError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PersistError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, filename.to_string()))
}
