//! Wizdump engine: converts note archives into text, Markdown, source or HTML files.
mod archive;
mod attachments;
mod batch;
mod config;
mod content;
mod convert;
mod decode;
mod filename;
mod index;
mod persist;
mod pipeline;
mod report;
mod resources;
mod select;
mod types;

pub use archive::{ArchiveError, ArchiveReader, MOBILE_ENTRY, PRIMARY_ENTRY};
pub use attachments::{
    attachments_dir, copy_dir_recursive, resolve_attachments, validate_attachments,
    AttachmentError, AttachmentMismatch, AttachmentResolution, ATTACHMENTS_SUFFIX,
};
pub use batch::{export_all, BatchSummary, DocumentRecord, RecordStatus};
pub use config::{ExportConfig, DEFAULT_SOURCE_CODE_EXTENSIONS};
pub use content::{ContentDocument, ContentNode, ElementNode};
pub use convert::{
    convert_body, Conversion, ConversionPolicy, UnsupportedStructureError, LINE_ENDING,
    RESOURCE_PREFIX,
};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use filename::{sanitize_attachment_name, sanitize_file_name, REPLACEMENT_CHAR};
pub use index::{
    parse_modified_time, IndexError, IndexProvider, MemoryIndex, SqliteIndex, INDEX_FILE_NAME,
    MODIFIED_TIME_FORMAT,
};
pub use persist::{
    ensure_output_dir, stamp_modified, write_if_unmodified, AtomicFileWriter, PersistError,
    WriteOutcome,
};
pub use pipeline::{export_document, ExportError};
pub use report::{build_report, write_report};
pub use resources::{
    extract_resources, plan_resources, resource_dir_name, resource_link_dir, ExtractedResources,
    PlannedResource, ResourceError,
};
pub use select::{
    classify_title, prepare_html_document, render_document, RenderedBody, RenderedDocument,
    TitleKind,
};
pub use types::{
    AttachmentDescriptor, DocumentDescriptor, DocumentId, DocumentOutcome, ExportFormat,
};
