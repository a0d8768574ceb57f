//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Exports note archives from a local note store into plain files.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// RON settings file; command-line flags take precedence over it
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Export every note of one account
    #[command(visible_alias = "e")]
    Export {
        #[command(flatten)]
        args: ExportArgs,
    },

    /// List the account directories below a data directory (the client's
    /// default data directory when none is given)
    #[command(visible_alias = "ls")]
    ListAccounts {
        /// Data directory holding one folder per account
        #[arg(long, value_hint = clap::ValueHint::DirPath)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Account data directory containing the index database
    #[arg(
        short,
        long,
        value_hint = clap::ValueHint::DirPath,
        conflicts_with_all = ["data_dir", "account_name"]
    )]
    pub account: Option<PathBuf>,

    /// Data directory holding one folder per account
    #[arg(long, value_hint = clap::ValueHint::DirPath, requires = "account_name")]
    pub data_dir: Option<PathBuf>,

    /// Account folder name below --data-dir, or below the client's default
    /// data directory in the user's documents
    #[arg(long)]
    pub account_name: Option<String>,

    /// Output directory; the account's folder layout is mirrored below it
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Also attempt notes the index marks as not downloaded
    #[arg(long)]
    pub include_not_downloaded: bool,

    /// Write a JSON report of the run to this file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn export_accepts_account_and_output() {
        let cli = Cli::try_parse_from(["wizdump", "-vv", "export", "--account", "a", "-o", "out"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Export { args } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.account, Some(PathBuf::from("a")));
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert!(!args.include_not_downloaded);
    }

    #[test]
    fn account_conflicts_with_data_dir() {
        let result = Cli::try_parse_from([
            "wizdump",
            "export",
            "--account",
            "a",
            "--data-dir",
            "d",
            "--account-name",
            "n",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn data_dir_requires_account_name() {
        assert!(Cli::try_parse_from(["wizdump", "export", "--data-dir", "d"]).is_err());
    }

    #[test]
    fn account_name_alone_is_accepted() {
        let cli = Cli::try_parse_from(["wizdump", "export", "--account-name", "me", "-o", "out"])
            .unwrap();
        let Commands::Export { args } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.account_name.as_deref(), Some("me"));
        assert_eq!(args.data_dir, None);
    }
}
