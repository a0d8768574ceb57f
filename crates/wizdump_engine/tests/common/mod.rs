#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use wizdump_engine::DocumentDescriptor;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const MODIFIED: &str = "2021-06-01 12:30:00";

pub fn init_logging() {
    export_logging::initialize_for_tests();
}

/// Writes a note archive with the given entries.
pub fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

pub fn html_page(body: &str) -> Vec<u8> {
    format!("<html><head><title>x</title></head><body>{body}</body></html>").into_bytes()
}

pub fn document(id: &str, title: &str, location: &str, file_name: &str) -> DocumentDescriptor {
    DocumentDescriptor {
        id: id.to_string(),
        title: title.to_string(),
        location: location.to_string(),
        file_name: file_name.to_string(),
        modified: MODIFIED.to_string(),
        downloaded: true,
    }
}

/// Account and output directories inside a temp dir.
pub struct Workspace {
    pub temp: tempfile::TempDir,
    pub account: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = tempfile::TempDir::new().unwrap();
        let account = temp.path().join("account");
        let output = temp.path().join("output");
        fs::create_dir_all(&account).unwrap();
        Self {
            temp,
            account,
            output,
        }
    }

    pub fn config(&self) -> wizdump_engine::ExportConfig {
        wizdump_engine::ExportConfig::new(&self.account, &self.output)
    }
}
