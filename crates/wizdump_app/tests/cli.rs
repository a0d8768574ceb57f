use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn wizdump() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wizdump"))
}

#[test]
fn list_accounts_prints_account_folders() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("b@example.com")).unwrap();
    fs::create_dir(temp.path().join("a@example.com")).unwrap();

    let output = wizdump()
        .arg("list-accounts")
        .arg("--data-dir")
        .arg(temp.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "a@example.com\nb@example.com\n"
    );
}

#[test]
fn missing_index_fails_the_run() {
    let temp = TempDir::new().unwrap();
    let account = temp.path().join("account");
    fs::create_dir(&account).unwrap();

    let status = wizdump()
        .arg("export")
        .arg("--account")
        .arg(&account)
        .arg("--output")
        .arg(temp.path().join("out"))
        .status()
        .unwrap();

    assert!(!status.success());
}

#[test]
fn settings_file_supplies_the_data_directory() {
    let temp = TempDir::new().unwrap();
    let settings = temp.path().join("wizdump.ron");
    let data_dir = temp.path().join("Data");
    fs::create_dir_all(data_dir.join("me")).unwrap();
    fs::write(
        &settings,
        format!("(data_dir: Some({:?}))", data_dir.to_string_lossy()),
    )
    .unwrap();

    let output = wizdump()
        .arg("--config")
        .arg(&settings)
        .arg("list-accounts")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "me\n");
}
