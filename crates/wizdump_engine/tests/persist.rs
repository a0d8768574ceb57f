use std::fs;
use std::time::{Duration, SystemTime};

use wizdump_engine::{
    ensure_output_dir, parse_modified_time, stamp_modified, write_if_unmodified, AtomicFileWriter,
    WriteOutcome,
};
use tempfile::TempDir;

fn source_time() -> SystemTime {
    parse_modified_time("2021-06-01 12:30:00").unwrap()
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("doc.md", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "doc.md");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("doc.md", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("doc.md", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("doc.md").exists());
}

#[test]
fn new_destination_is_written_and_stamped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("Note.txt");

    let outcome = write_if_unmodified(&path, "body\r\n", source_time()).unwrap();

    assert_eq!(outcome, WriteOutcome::Written);
    assert_eq!(fs::read(&path).unwrap(), b"body\r\n");
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), source_time());
}

#[test]
fn repeated_export_of_unchanged_note_is_skipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Note.txt");

    write_if_unmodified(&path, "body\r\n", source_time()).unwrap();
    let second = write_if_unmodified(&path, "body\r\n", source_time()).unwrap();

    assert_eq!(second, WriteOutcome::Unchanged);
    assert_eq!(fs::read(&path).unwrap(), b"body\r\n");
}

#[test]
fn equal_timestamp_with_new_content_is_rewritten() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Note.txt");

    write_if_unmodified(&path, "old\r\n", source_time()).unwrap();
    let outcome = write_if_unmodified(&path, "new\r\n", source_time()).unwrap();

    assert_eq!(outcome, WriteOutcome::Written);
    assert_eq!(fs::read(&path).unwrap(), b"new\r\n");
}

#[test]
fn destination_edited_after_export_is_preserved() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Note.txt");
    fs::write(&path, "edited by hand").unwrap();
    stamp_modified(&path, source_time() + Duration::from_secs(60)).unwrap();

    let outcome = write_if_unmodified(&path, "export\r\n", source_time()).unwrap();

    assert_eq!(outcome, WriteOutcome::SkippedUserModified);
    assert_eq!(fs::read_to_string(&path).unwrap(), "edited by hand");
}

#[test]
fn newer_source_overwrites_older_destination() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Note.txt");
    fs::write(&path, "stale").unwrap();
    stamp_modified(&path, source_time() - Duration::from_secs(60)).unwrap();

    let outcome = write_if_unmodified(&path, "fresh\r\n", source_time()).unwrap();

    assert_eq!(outcome, WriteOutcome::Written);
    assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\r\n");
}

#[cfg(unix)]
#[test]
fn exported_files_are_readable_by_others() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Note.txt");
    write_if_unmodified(&path, "body", source_time()).unwrap();
    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}
