use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Names of the account folders directly below `data_dir`, sorted.
pub fn list_accounts(data_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("failed to read data directory {:?}", data_dir))?;
    let mut accounts = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read {:?}", data_dir))?;
        if entry.file_type()?.is_dir() {
            accounts.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    accounts.sort();
    Ok(accounts)
}
