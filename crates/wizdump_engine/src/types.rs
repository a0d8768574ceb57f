use std::fmt;
use std::path::{Path, PathBuf};

use crate::persist::WriteOutcome;

pub type DocumentId = String;

/// One note as listed by the account index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDescriptor {
    pub id: DocumentId,
    pub title: String,
    /// Folder of the note inside the account, `/`-delimited (e.g. `/My Notes/Work/`).
    pub location: String,
    /// Archive file name inside `location`.
    pub file_name: String,
    /// Last modification time as stored by the index (`yyyy-MM-dd HH:mm:ss`).
    pub modified: String,
    pub downloaded: bool,
}

impl DocumentDescriptor {
    /// Path of the note's archive below the account directory.
    pub fn archive_path(&self, account_dir: &Path) -> PathBuf {
        let mut path = account_dir.to_path_buf();
        for part in self.location.split(&['/', '\\'][..]).filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path.push(&self.file_name);
        path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    pub document_id: DocumentId,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    Text,
    SourceCode,
    Html,
}

impl ExportFormat {
    /// Suffix appended to the output file stem to name the resource directory.
    pub fn resource_suffix(self) -> &'static str {
        match self {
            ExportFormat::Markdown => ".assets",
            ExportFormat::Text | ExportFormat::SourceCode | ExportFormat::Html => "_files",
        }
    }

    /// The format a document ends up in once an image has been seen.
    pub fn with_images(self) -> Self {
        match self {
            ExportFormat::Text => ExportFormat::Markdown,
            other => other,
        }
    }

    /// Whether stylesheets are dropped when extracting resources.
    pub fn drops_stylesheets(self) -> bool {
        matches!(self, ExportFormat::Markdown | ExportFormat::Text)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
            ExportFormat::SourceCode => "source_code",
            ExportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of exporting a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// The note was converted and committed (or deliberately left alone) at `output_file`.
    Exported {
        format: ExportFormat,
        output_file: PathBuf,
        write: WriteOutcome,
        resources: usize,
    },
    /// The note's only attachment is the note itself and was copied verbatim.
    CopiedAttachment { output_file: PathBuf },
}

impl DocumentOutcome {
    pub fn output_file(&self) -> &Path {
        match self {
            DocumentOutcome::Exported { output_file, .. } => output_file,
            DocumentOutcome::CopiedAttachment { output_file } => output_file,
        }
    }
}
