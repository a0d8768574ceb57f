use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::content::ContentDocument;
use crate::decode::{decode_html, DecodeError};

/// Entry holding the note body.
pub const PRIMARY_ENTRY: &str = "index.html";
/// Mobile rendering of the note body, never exported.
pub const MOBILE_ENTRY: &str = "wiz_mobile.html";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to open archive {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive {path:?} is not a readable container: {source}")]
    Container {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("archive {path:?} has no \"{PRIMARY_ENTRY}\" entry")]
    MissingPrimaryEntry { path: PathBuf },
    #[error("failed to read entry \"{entry}\" of {path:?}: {source}")]
    Entry {
        path: PathBuf,
        entry: String,
        #[source]
        source: io::Error,
    },
    #[error("primary entry of {path:?} cannot be decoded: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

/// Read-only view over one note archive. Dropping it releases the file.
pub struct ArchiveReader {
    path: PathBuf,
    zip: ZipArchive<File>,
}

impl ArchiveReader {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let zip = ZipArchive::new(file).map_err(|source| ArchiveError::Container {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes and parses the primary entry.
    pub fn primary_document(&mut self) -> Result<ContentDocument, ArchiveError> {
        let mut bytes = Vec::new();
        let read = self.open_entry(PRIMARY_ENTRY)?.read_to_end(&mut bytes);
        read.map_err(|source| entry_error(&self.path, PRIMARY_ENTRY, source))?;
        let decoded = decode_html(&bytes).map_err(|source| ArchiveError::Decode {
            path: self.path.clone(),
            source,
        })?;
        Ok(ContentDocument::parse(&decoded.html))
    }

    /// Names of every entry, in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(str::to_owned).collect()
    }

    /// Opens a data stream over a single entry.
    pub fn open_entry(&mut self, name: &str) -> Result<impl Read + '_, ArchiveError> {
        match self.zip.by_name(name) {
            Ok(entry) => Ok(entry),
            Err(ZipError::FileNotFound) if name == PRIMARY_ENTRY => {
                Err(ArchiveError::MissingPrimaryEntry {
                    path: self.path.clone(),
                })
            }
            Err(ZipError::Io(source)) => Err(entry_error(&self.path, name, source)),
            Err(other) => Err(entry_error(&self.path, name, io::Error::other(other))),
        }
    }

    /// Writes one entry to `dest`, creating parent directories and replacing any
    /// existing file. Returns the number of bytes written.
    pub fn extract_entry(&mut self, name: &str, dest: &Path) -> Result<u64, ArchiveError> {
        let path = self.path.clone();
        let io_error = |source| entry_error(&path, name, source);
        let mut entry = self.open_entry(name)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let mut target = File::create(dest).map_err(io_error)?;
        io::copy(&mut entry, &mut target).map_err(io_error)
    }
}

fn entry_error(path: &Path, entry: &str, source: io::Error) -> ArchiveError {
    ArchiveError::Entry {
        path: path.to_path_buf(),
        entry: entry.to_string(),
        source,
    }
}
