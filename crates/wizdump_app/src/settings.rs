use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use export_logging::{export_info, export_warn};
use serde::{Deserialize, Serialize};
use wizdump_engine::ExportConfig;

use crate::cli::ExportArgs;

/// Folders below the user's documents directory where the desktop client
/// keeps one folder per account.
const DEFAULT_DATA_SUBDIRS: [&str; 2] = ["My Knowledge", "Data"];

/// Settings read from the optional RON file. Every field is optional; unset
/// fields fall back to the command line or the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub account: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub account_name: Option<String>,
    pub output: Option<PathBuf>,
    pub index_file: Option<String>,
    pub source_code_extensions: Option<Vec<String>>,
    pub include_not_downloaded: Option<bool>,
    pub report: Option<PathBuf>,
}

/// Everything an export run needs once flags and file settings are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub config: ExportConfig,
    pub report: Option<PathBuf>,
}

/// Loads settings from `path`. A missing file yields defaults silently; an
/// unreadable or malformed one is reported and also yields defaults.
pub fn load_settings(path: &Path) -> FileSettings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return FileSettings::default();
        }
        Err(err) => {
            export_warn!("Failed to read settings from {:?}: {}", path, err);
            return FileSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            export_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            export_warn!("Failed to parse settings from {:?}: {}", path, err);
            FileSettings::default()
        }
    }
}

/// The desktop client's data directory for the current user, if the platform
/// has a documents directory.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::document_dir()
        .map(|docs| DEFAULT_DATA_SUBDIRS.iter().fold(docs, |dir, sub| dir.join(sub)))
}

/// Picks the data directory from the flag, then the settings file, then `fallback`.
pub fn resolve_data_dir(
    flag: Option<PathBuf>,
    file: Option<PathBuf>,
    fallback: Option<PathBuf>,
) -> Result<PathBuf> {
    flag.or(file)
        .or(fallback)
        .context("no data directory given and no documents directory found; pass --data-dir")
}

/// Merges command-line flags over file settings. A named account without a
/// data directory is looked up below `fallback_data_dir`.
pub fn resolve_export(
    args: &ExportArgs,
    file: FileSettings,
    fallback_data_dir: Option<PathBuf>,
) -> Result<ExportPlan> {
    let account_dir = if let Some(account) = &args.account {
        account.clone()
    } else if let Some(name) = &args.account_name {
        resolve_data_dir(args.data_dir.clone(), file.data_dir, fallback_data_dir)?.join(name)
    } else if let Some(account) = file.account {
        account
    } else if let Some(name) = &file.account_name {
        resolve_data_dir(None, file.data_dir, fallback_data_dir)?.join(name)
    } else {
        bail!("no account given; pass --account or --account-name");
    };

    let Some(output_dir) = args.output.clone().or(file.output) else {
        bail!("no output directory given; pass --output");
    };

    let mut config = ExportConfig::new(account_dir, output_dir);
    if let Some(index_file) = file.index_file {
        config.index_file = index_file;
    }
    if let Some(extensions) = file.source_code_extensions {
        config.source_code_extensions = extensions;
    }
    config.include_not_downloaded =
        args.include_not_downloaded || file.include_not_downloaded.unwrap_or(false);

    Ok(ExportPlan {
        config,
        report: args.report.clone().or(file.report),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            load_settings(&temp.path().join("absent.ron")),
            FileSettings::default()
        );
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(output: ").unwrap();
        assert_eq!(load_settings(&path), FileSettings::default());
    }

    #[test]
    fn partial_file_is_parsed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wizdump.ron");
        fs::write(
            &path,
            r#"(output: Some("exported"), source_code_extensions: Some([".rs"]))"#,
        )
        .unwrap();
        let settings = load_settings(&path);
        assert_eq!(settings.output, Some(PathBuf::from("exported")));
        assert_eq!(settings.source_code_extensions, Some(vec![".rs".to_string()]));
        assert_eq!(settings.account, None);
    }

    #[test]
    fn flags_override_file_settings() {
        let args = ExportArgs {
            account: Some(PathBuf::from("cli_account")),
            output: Some(PathBuf::from("cli_out")),
            ..ExportArgs::default()
        };
        let file = FileSettings {
            account: Some(PathBuf::from("file_account")),
            output: Some(PathBuf::from("file_out")),
            include_not_downloaded: Some(true),
            index_file: Some("other.db".into()),
            report: Some(PathBuf::from("report.json")),
            ..FileSettings::default()
        };

        let plan = resolve_export(&args, file, None).unwrap();

        assert_eq!(plan.config.account_dir, PathBuf::from("cli_account"));
        assert_eq!(plan.config.output_dir, PathBuf::from("cli_out"));
        assert_eq!(plan.config.index_file, "other.db");
        assert!(plan.config.include_not_downloaded);
        assert_eq!(plan.report, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn account_can_be_named_below_a_data_dir() {
        let args = ExportArgs {
            output: Some(PathBuf::from("out")),
            ..ExportArgs::default()
        };
        let file = FileSettings {
            data_dir: Some(PathBuf::from("Data")),
            account_name: Some("me@example.com".into()),
            ..FileSettings::default()
        };

        let plan = resolve_export(&args, file, None).unwrap();

        assert_eq!(
            plan.config.account_dir,
            PathBuf::from("Data").join("me@example.com")
        );
    }

    #[test]
    fn missing_account_or_output_is_an_error() {
        let no_account = ExportArgs {
            output: Some(PathBuf::from("out")),
            ..ExportArgs::default()
        };
        let fallback = Some(PathBuf::from("Data"));
        assert!(resolve_export(&no_account, FileSettings::default(), fallback).is_err());

        let no_output = ExportArgs {
            account: Some(PathBuf::from("a")),
            ..ExportArgs::default()
        };
        assert!(resolve_export(&no_output, FileSettings::default(), None).is_err());
    }

    #[test]
    fn data_dir_comes_from_flag_then_file_then_fallback() {
        let flag = Some(PathBuf::from("flag"));
        let file = Some(PathBuf::from("file"));
        let fallback = Some(PathBuf::from("docs"));

        let pick = |flag: &Option<PathBuf>, file: &Option<PathBuf>, fallback: &Option<PathBuf>| {
            resolve_data_dir(flag.clone(), file.clone(), fallback.clone()).unwrap()
        };
        assert_eq!(pick(&flag, &file, &fallback), PathBuf::from("flag"));
        assert_eq!(pick(&None, &file, &fallback), PathBuf::from("file"));
        assert_eq!(pick(&None, &None, &fallback), PathBuf::from("docs"));
        assert!(resolve_data_dir(None, None, None).is_err());
    }

    #[test]
    fn named_account_without_data_dir_uses_the_fallback() {
        let args = ExportArgs {
            account_name: Some("me@example.com".into()),
            output: Some(PathBuf::from("out")),
            ..ExportArgs::default()
        };
        let fallback = PathBuf::from("Documents").join("My Knowledge").join("Data");

        let plan = resolve_export(&args, FileSettings::default(), Some(fallback.clone())).unwrap();

        assert_eq!(plan.config.account_dir, fallback.join("me@example.com"));
    }

    #[test]
    fn settings_file_data_dir_wins_over_the_fallback() {
        let args = ExportArgs {
            account_name: Some("me".into()),
            output: Some(PathBuf::from("out")),
            ..ExportArgs::default()
        };
        let file = FileSettings {
            data_dir: Some(PathBuf::from("Data")),
            ..FileSettings::default()
        };

        let plan = resolve_export(&args, file, Some(PathBuf::from("docs"))).unwrap();

        assert_eq!(plan.config.account_dir, PathBuf::from("Data").join("me"));
    }

    #[test]
    fn default_data_dir_ends_in_the_client_folder() {
        if let Some(dir) = default_data_dir() {
            assert!(dir.ends_with(Path::new("My Knowledge").join("Data")));
        }
    }
}
