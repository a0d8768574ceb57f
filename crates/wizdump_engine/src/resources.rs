use std::path::{Component, Path, PathBuf};

use export_logging::{export_debug, export_warn};

use crate::archive::{ArchiveError, ArchiveReader, MOBILE_ENTRY, PRIMARY_ENTRY};
use crate::convert::RESOURCE_PREFIX;
use crate::ExportFormat;

/// Editor-owned helper files share this name prefix and are never exported.
const EDITOR_FILE_PREFIX: &str = "wizEditor";

/// Output extensions removed before the resource suffix is appended.
const OUTPUT_EXTENSIONS: &[&str] = &[".txt", ".md", ".html"];

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("unexpected entry \"{entry}\" in {archive:?}")]
    UnexpectedArchiveEntry { archive: PathBuf, entry: String },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// One archive entry scheduled for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedResource {
    pub entry: String,
    /// Path below the resource directory.
    pub relative: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedResources {
    pub dir: PathBuf,
    pub count: usize,
    pub bytes: u64,
}

/// Name of the sibling directory holding the resources of `output_file`.
///
/// `Note.md` → `Note.assets`, `Note.txt` → `Note_files`, `run.py` → `run.py_files`.
pub fn resource_dir_name(output_file: &Path, format: ExportFormat) -> String {
    let file_name = output_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = OUTPUT_EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
        .unwrap_or(&file_name);
    format!("{stem}{}", format.resource_suffix())
}

/// Resource directory name as written inside a Markdown link target.
pub fn resource_link_dir(output_file: &Path, format: ExportFormat) -> String {
    resource_dir_name(output_file, format).replace(' ', "%20")
}

/// Decides which entries to extract. The archive layout is fixed: anything
/// outside the primary entries and the resource folder is rejected.
pub fn plan_resources(
    archive: &Path,
    entries: &[String],
    format: ExportFormat,
) -> Result<Vec<PlannedResource>, ResourceError> {
    let mut planned = Vec::new();
    for entry in entries {
        if entry == PRIMARY_ENTRY || entry == MOBILE_ENTRY || entry.ends_with('/') {
            continue;
        }
        let relative = match entry.strip_prefix(RESOURCE_PREFIX) {
            Some(relative) if is_plain_relative(relative) => relative,
            _ => {
                return Err(ResourceError::UnexpectedArchiveEntry {
                    archive: archive.to_path_buf(),
                    entry: entry.clone(),
                })
            }
        };
        let file_name = relative.rsplit('/').next().unwrap_or(relative);
        if file_name.starts_with(EDITOR_FILE_PREFIX) {
            continue;
        }
        if format.drops_stylesheets() && file_name.ends_with(".css") {
            continue;
        }
        planned.push(PlannedResource {
            entry: entry.clone(),
            relative: relative.to_string(),
        });
    }
    Ok(planned)
}

/// Extracts the embedded resources of an exported note next to `output_file`.
///
/// The directory is only created when at least one resource is extracted.
pub fn extract_resources(
    archive: &mut ArchiveReader,
    output_file: &Path,
    format: ExportFormat,
) -> Result<ExtractedResources, ResourceError> {
    let planned = plan_resources(archive.path(), &archive.entry_names(), format)?;
    let parent = output_file.parent().unwrap_or_else(|| Path::new(""));
    let dir = parent.join(resource_dir_name(output_file, format));

    let mut bytes = 0;
    for resource in &planned {
        let dest = dir.join(&resource.relative);
        bytes += archive.extract_entry(&resource.entry, &dest)?;
        export_debug!("Extracted {} to {:?}", resource.entry, dest);
    }

    if format == ExportFormat::Text && !planned.is_empty() {
        export_warn!("Txt file {:?} has index_files.", archive.path());
    }

    Ok(ExtractedResources {
        dir,
        count: planned.len(),
        bytes,
    })
}

fn is_plain_relative(relative: &str) -> bool {
    !relative.is_empty()
        && Path::new(relative)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
