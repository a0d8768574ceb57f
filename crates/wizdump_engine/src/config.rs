use std::path::{Path, PathBuf};

use crate::index::INDEX_FILE_NAME;

/// Title extensions exported verbatim as source code.
pub const DEFAULT_SOURCE_CODE_EXTENSIONS: &[&str] = &[
    ".pas", ".dpr", ".vbs", ".vb", ".bat", ".cmd", ".sh", ".ps1", ".sln", ".vcxproj", ".cpp", ".h",
    ".hpp", ".csproj", ".cs", ".go", ".py", ".lua", ".js", ".ts",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Account data directory holding the index and the note archives.
    pub account_dir: PathBuf,
    pub output_dir: PathBuf,
    pub index_file: String,
    /// Lower-case extensions with a leading dot.
    pub source_code_extensions: Vec<String>,
    /// Also attempt notes the index marks as not yet downloaded.
    pub include_not_downloaded: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            account_dir: PathBuf::new(),
            output_dir: PathBuf::from("output"),
            index_file: INDEX_FILE_NAME.to_string(),
            source_code_extensions: DEFAULT_SOURCE_CODE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            include_not_downloaded: false,
        }
    }
}

impl ExportConfig {
    pub fn new(account_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            account_dir: account_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.account_dir.join(&self.index_file)
    }

    /// `ext` is compared case-insensitively, with or without its leading dot.
    pub fn is_source_code_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.source_code_extensions
            .iter()
            .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Where a path below the account directory lands below the output directory.
    pub fn mirrored_output_path(&self, account_path: &Path) -> PathBuf {
        match account_path.strip_prefix(&self.account_dir) {
            Ok(relative) => self.output_dir.join(relative),
            Err(_) => self
                .output_dir
                .join(account_path.file_name().unwrap_or(account_path.as_os_str())),
        }
    }
}
