use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::attachments::AttachmentMismatch;
use crate::batch::{BatchSummary, DocumentRecord, RecordStatus};
use crate::persist::{AtomicFileWriter, PersistError};
use crate::DocumentOutcome;

/// JSON rendering of a finished batch.
pub fn build_report(summary: &BatchSummary) -> Value {
    json!({
        "processed": summary.processed,
        "failed": summary.failed,
        "needs_download": summary.needs_download,
        "elapsed_seconds": summary.elapsed.as_secs_f64(),
        "documents": summary.records.iter().map(record_json).collect::<Vec<_>>(),
        "attachment_mismatches": summary
            .attachment_mismatches
            .iter()
            .map(mismatch_json)
            .collect::<Vec<_>>(),
    })
}

/// Writes the report for `summary` to `path`, replacing any previous report.
pub fn write_report(path: &Path, summary: &BatchSummary) -> Result<PathBuf, PersistError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PersistError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let content = serde_json::to_string_pretty(&build_report(summary))
        .map_err(|err| PersistError::Io(err.into()))?;
    AtomicFileWriter::new(dir).write(filename, &content)
}

fn record_json(record: &DocumentRecord) -> Value {
    let mut value = json!({
        "id": record.id,
        "title": record.title,
        "archive": record.archive.to_string_lossy(),
    });
    let details = match &record.status {
        RecordStatus::Done(DocumentOutcome::Exported {
            format,
            output_file,
            write,
            resources,
        }) => json!({
            "status": "exported",
            "format": format.as_str(),
            "output": output_file.to_string_lossy(),
            "write": write.as_str(),
            "resources": resources,
        }),
        RecordStatus::Done(DocumentOutcome::CopiedAttachment { output_file }) => json!({
            "status": "copied_attachment",
            "output": output_file.to_string_lossy(),
        }),
        RecordStatus::Failed(message) => json!({
            "status": "failed",
            "error": message,
        }),
        RecordStatus::NeedsDownload => json!({ "status": "needs_download" }),
    };
    if let (Some(target), Value::Object(extra)) = (value.as_object_mut(), details) {
        target.extend(extra);
    }
    value
}

fn mismatch_json(mismatch: &AttachmentMismatch) -> Value {
    let (document_id, file_name) = match mismatch {
        AttachmentMismatch::UnknownDocument {
            document_id,
            file_name,
        }
        | AttachmentMismatch::MissingFile {
            document_id,
            file_name,
            ..
        } => (document_id, file_name),
    };
    json!({
        "document_id": document_id,
        "file_name": file_name,
        "message": mismatch.to_string(),
    })
}
