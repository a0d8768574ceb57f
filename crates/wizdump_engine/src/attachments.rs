use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::filename::sanitize_attachment_name;
use crate::{AttachmentDescriptor, DocumentId};

/// Suffix of the folder holding a note's attachments, next to its archive.
pub const ATTACHMENTS_SUFFIX: &str = "_Attachments";

const ARCHIVE_EXTENSION: &str = ".ziw";

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("failed to read attachments in {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to copy attachments from {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An indexed attachment with no matching file on disk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentMismatch {
    #[error("Cannot find Document for attachment \"{file_name}\"")]
    UnknownDocument {
        document_id: DocumentId,
        file_name: String,
    },
    #[error("Cannot find attachment \"{file_name}\" of document {archive:?}")]
    MissingFile {
        document_id: DocumentId,
        file_name: String,
        archive: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentResolution {
    /// The note has no attachment folder.
    None,
    /// The only attachment is the note itself; it was copied to the output path.
    DocumentIsAttachment { source: PathBuf },
    /// The attachment folder was mirrored beside the output.
    Mirrored { target: PathBuf, files: u64 },
}

/// Attachment folder of the note stored at `archive_path`.
pub fn attachments_dir(archive_path: &Path) -> PathBuf {
    let raw = archive_path.to_string_lossy();
    let base = raw.strip_suffix(ARCHIVE_EXTENSION).unwrap_or(&raw);
    PathBuf::from(format!("{base}{ATTACHMENTS_SUFFIX}"))
}

/// Handles the attachment folder of a note before conversion.
///
/// `title` is the sanitized note title and `output_title_path` the mirrored
/// output path for that title.
pub fn resolve_attachments(
    archive_path: &Path,
    title: &str,
    output_title_path: &Path,
) -> Result<AttachmentResolution, AttachmentError> {
    let source_dir = attachments_dir(archive_path);
    if !source_dir.is_dir() {
        return Ok(AttachmentResolution::None);
    }

    let files = list_files(&source_dir)?;
    if let [single] = files.as_slice() {
        let name = single
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if is_same_document(&name, title) {
            fs::copy(single, output_title_path).map_err(|source| AttachmentError::Copy {
                from: single.clone(),
                to: output_title_path.to_path_buf(),
                source,
            })?;
            return Ok(AttachmentResolution::DocumentIsAttachment {
                source: single.clone(),
            });
        }
    }

    let mut target = output_title_path.as_os_str().to_owned();
    target.push(ATTACHMENTS_SUFFIX);
    let target = PathBuf::from(target);
    let copied = copy_dir_recursive(&source_dir, &target)?;
    Ok(AttachmentResolution::Mirrored {
        target,
        files: copied,
    })
}

fn is_same_document(file_name: &str, title: &str) -> bool {
    let folded = sanitize_attachment_name(title);
    [title.to_string(), folded]
        .iter()
        .any(|candidate| file_name == candidate || file_name == candidate.replace('_', " "))
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, AttachmentError> {
    let read_error = |source| AttachmentError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if entry.file_type().map_err(read_error)?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Copies `from` into `to` recursively, replacing existing files. Returns the
/// number of files copied.
pub fn copy_dir_recursive(from: &Path, to: &Path) -> Result<u64, AttachmentError> {
    let copy_error = |source| AttachmentError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    fs::create_dir_all(to).map_err(copy_error)?;
    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(|err| copy_error(io::Error::from(err)))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|err| copy_error(io::Error::other(err)))?;
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(copy_error)?;
        } else {
            fs::copy(entry.path(), &dest).map_err(copy_error)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Checks every indexed attachment against the files on disk.
///
/// `archives` maps each document id to its archive path.
pub fn validate_attachments(
    attachments: &[AttachmentDescriptor],
    archives: &HashMap<DocumentId, PathBuf>,
) -> Vec<AttachmentMismatch> {
    attachments
        .iter()
        .filter_map(|attachment| {
            let Some(archive) = archives.get(&attachment.document_id) else {
                return Some(AttachmentMismatch::UnknownDocument {
                    document_id: attachment.document_id.clone(),
                    file_name: attachment.file_name.clone(),
                });
            };
            let expected =
                attachments_dir(archive).join(sanitize_attachment_name(&attachment.file_name));
            if expected.exists() {
                None
            } else {
                Some(AttachmentMismatch::MissingFile {
                    document_id: attachment.document_id.clone(),
                    file_name: attachment.file_name.clone(),
                    archive: archive.clone(),
                })
            }
        })
        .collect()
}
