use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use export_logging::{export_error, export_info, export_warn};

use crate::attachments::{validate_attachments, AttachmentMismatch};
use crate::config::ExportConfig;
use crate::index::{IndexError, IndexProvider};
use crate::pipeline::export_document;
use crate::{DocumentId, DocumentOutcome};

/// How one indexed note fared in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Done(DocumentOutcome),
    Failed(String),
    NeedsDownload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub title: String,
    pub archive: PathBuf,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Notes the pipeline ran on, successful or not.
    pub processed: usize,
    pub failed: usize,
    pub needs_download: usize,
    pub records: Vec<DocumentRecord>,
    pub attachment_mismatches: Vec<AttachmentMismatch>,
    pub elapsed: Duration,
}

/// Exports every note listed by `index`.
///
/// Per-note failures are logged and recorded; only failing to read the index
/// aborts the run.
pub fn export_all(
    config: &ExportConfig,
    index: &dyn IndexProvider,
) -> Result<BatchSummary, IndexError> {
    let started = Instant::now();
    let documents = index.documents()?;

    let archives: HashMap<DocumentId, PathBuf> = documents
        .iter()
        .map(|doc| (doc.id.clone(), doc.archive_path(&config.account_dir)))
        .collect();

    let mut records = Vec::with_capacity(documents.len());
    let mut processed = 0;
    let mut failed = 0;
    let mut needs_download = 0;

    for doc in &documents {
        let archive = doc.archive_path(&config.account_dir);
        if !doc.downloaded && !config.include_not_downloaded {
            export_warn!("Need download: {}", doc.title);
            needs_download += 1;
            records.push(DocumentRecord {
                id: doc.id.clone(),
                title: doc.title.clone(),
                archive,
                status: RecordStatus::NeedsDownload,
            });
            continue;
        }

        let status = match export_document(config, doc) {
            Ok(outcome) => RecordStatus::Done(outcome),
            Err(err) => {
                export_error!("Failed to export {:?} (\"{}\"): {}", archive, doc.title, err);
                failed += 1;
                RecordStatus::Failed(err.to_string())
            }
        };
        processed += 1;
        records.push(DocumentRecord {
            id: doc.id.clone(),
            title: doc.title.clone(),
            archive,
            status,
        });
    }

    let attachment_mismatches = validate_attachments(&index.attachments()?, &archives);
    for mismatch in &attachment_mismatches {
        export_warn!("{}", mismatch);
    }

    let elapsed = started.elapsed();
    export_info!(
        "{} files processed in {} seconds.",
        processed,
        elapsed.as_secs_f64()
    );

    Ok(BatchSummary {
        processed,
        failed,
        needs_download,
        records,
        attachment_mismatches,
        elapsed,
    })
}
