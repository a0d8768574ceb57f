//! Account index access.
//!
//! The note store keeps one SQLite database per account listing every note
//! and attachment. The exporter only ever reads it.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Local, NaiveDateTime, TimeZone};
use rusqlite::{Connection, OpenFlags};

use crate::{AttachmentDescriptor, DocumentDescriptor};

/// Default index file name inside an account directory.
pub const INDEX_FILE_NAME: &str = "index.db";

/// Pattern of the modification timestamps stored in the index.
pub const MODIFIED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DOCUMENTS_QUERY: &str = "SELECT DOCUMENT_GUID, DOCUMENT_TITLE, DOCUMENT_LOCATION, \
     DOCUMENT_NAME, DT_DATA_MODIFIED, WIZ_DOWNLOADED FROM WIZ_DOCUMENT";

const ATTACHMENTS_QUERY: &str =
    "SELECT DOCUMENT_GUID, ATTACHMENT_NAME FROM WIZ_DOCUMENT_ATTACHMENT";

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to open index {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("index query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("invalid modification time \"{value}\": {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("modification time \"{value}\" does not exist in the local time zone")]
    NonexistentLocalTime { value: String },
}

pub trait IndexProvider {
    fn documents(&self) -> Result<Vec<DocumentDescriptor>, IndexError>;
    fn attachments(&self) -> Result<Vec<AttachmentDescriptor>, IndexError>;
}

/// Read-only view over an account's `index.db`.
pub struct SqliteIndex {
    conn: Connection,
}

impl SqliteIndex {
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| IndexError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { conn })
    }

    pub fn open_account(account_dir: &Path, index_file: &str) -> Result<Self, IndexError> {
        Self::open(&account_dir.join(index_file))
    }
}

impl IndexProvider for SqliteIndex {
    fn documents(&self) -> Result<Vec<DocumentDescriptor>, IndexError> {
        let mut stmt = self.conn.prepare(DOCUMENTS_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(DocumentDescriptor {
                id: row.get(0)?,
                title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                location: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                file_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                modified: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                downloaded: row.get::<_, Option<i64>>(5)?.unwrap_or(0) != 0,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn attachments(&self) -> Result<Vec<AttachmentDescriptor>, IndexError> {
        let mut stmt = self.conn.prepare(ATTACHMENTS_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(AttachmentDescriptor {
                document_id: row.get(0)?,
                file_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Index held in memory, for callers that already have the descriptors.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    pub documents: Vec<DocumentDescriptor>,
    pub attachments: Vec<AttachmentDescriptor>,
}

impl IndexProvider for MemoryIndex {
    fn documents(&self) -> Result<Vec<DocumentDescriptor>, IndexError> {
        Ok(self.documents.clone())
    }

    fn attachments(&self) -> Result<Vec<AttachmentDescriptor>, IndexError> {
        Ok(self.attachments.clone())
    }
}

/// Parses an index timestamp as local time.
pub fn parse_modified_time(value: &str) -> Result<SystemTime, IndexError> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), MODIFIED_TIME_FORMAT).map_err(
        |source| IndexError::InvalidTimestamp {
            value: value.to_string(),
            source,
        },
    )?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| IndexError::NonexistentLocalTime {
            value: value.to_string(),
        })?;
    Ok(SystemTime::from(local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timestamps_parse_with_second_precision() {
        let a = parse_modified_time("2021-03-04 05:06:07").unwrap();
        let b = parse_modified_time("2021-03-04 05:06:08").unwrap();
        assert_eq!(b.duration_since(a).unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn malformed_timestamps_are_rejected() {
        for bad in ["", "2021/03/04 05:06:07", "2021-03-04"] {
            assert!(matches!(
                parse_modified_time(bad),
                Err(IndexError::InvalidTimestamp { .. })
            ));
        }
    }
}
