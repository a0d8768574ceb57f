use std::fs;
use std::io;
use std::path::PathBuf;

use export_logging::{export_debug, export_info, export_warn};

use crate::archive::{ArchiveError, ArchiveReader};
use crate::attachments::{resolve_attachments, AttachmentError, AttachmentResolution};
use crate::config::ExportConfig;
use crate::convert::UnsupportedStructureError;
use crate::filename::sanitize_file_name;
use crate::index::{parse_modified_time, IndexError};
use crate::persist::{write_if_unmodified, PersistError, WriteOutcome};
use crate::resources::{extract_resources, ResourceError};
use crate::select::render_document;
use crate::{DocumentDescriptor, DocumentOutcome};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Timestamp(#[from] IndexError),
    #[error(transparent)]
    UnsupportedStructure(#[from] UnsupportedStructureError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("failed to create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Exports one note from its archive into the output tree.
///
/// The archive is opened and released within this call.
pub fn export_document(
    config: &ExportConfig,
    doc: &DocumentDescriptor,
) -> Result<DocumentOutcome, ExportError> {
    let archive_path = doc.archive_path(&config.account_dir);
    let modified = parse_modified_time(&doc.modified)?;
    let title = sanitize_file_name(&doc.title);

    let mut archive = ArchiveReader::open(&archive_path)?;
    let document = archive.primary_document()?;

    let title_path = archive_path.with_file_name(&title);
    let output_title_path = config.mirrored_output_path(&title_path);
    if let Some(parent) = output_title_path.parent() {
        fs::create_dir_all(parent).map_err(|source| ExportError::OutputDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match resolve_attachments(&archive_path, &title, &output_title_path)? {
        AttachmentResolution::DocumentIsAttachment { source } => {
            export_info!("Copied {:?} as {:?}", source, output_title_path);
            return Ok(DocumentOutcome::CopiedAttachment {
                output_file: output_title_path,
            });
        }
        AttachmentResolution::Mirrored { target, files } => {
            export_debug!("Mirrored {} attachment file(s) to {:?}", files, target);
        }
        AttachmentResolution::None => {}
    }

    let rendered = render_document(&document, &title, &output_title_path, config)?;
    let resources = extract_resources(&mut archive, &rendered.output_file, rendered.format)?;

    let write = write_if_unmodified(&rendered.output_file, rendered.body.as_str(), modified)?;
    match write {
        WriteOutcome::SkippedUserModified => {
            export_warn!("{:?} has been modified, skip it.", rendered.output_file)
        }
        WriteOutcome::Unchanged => export_debug!("{:?} is up to date", rendered.output_file),
        WriteOutcome::Written => {
            export_info!("Exported {:?} as {}", rendered.output_file, rendered.format)
        }
    }

    Ok(DocumentOutcome::Exported {
        format: rendered.format,
        output_file: rendered.output_file,
        write,
        resources: resources.count,
    })
}
