//! wizdump - exports a note store's archives into plain files.

mod accounts;
mod cli;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ExportArgs};
use export_logging::{export_error, export_info, export_warn, LogDestination};
use settings::{default_data_dir, load_settings, resolve_data_dir, resolve_export, FileSettings};
use wizdump_engine::{ensure_output_dir, export_all, write_report, SqliteIndex};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    export_logging::initialize(destination, export_logging::level_for_verbosity(cli.verbose));

    let file_settings = cli
        .config
        .as_deref()
        .map(load_settings)
        .unwrap_or_default();

    match &cli.command {
        Commands::Export { args } => run_export(args, file_settings),
        Commands::ListAccounts { data_dir } => run_list_accounts(data_dir.clone(), file_settings),
    }
}

fn run_export(args: &ExportArgs, file_settings: FileSettings) -> Result<()> {
    let plan = resolve_export(args, file_settings, default_data_dir())?;
    let config = &plan.config;
    export_info!(
        "Exporting account {:?} into {:?}",
        config.account_dir,
        config.output_dir
    );

    ensure_output_dir(&config.output_dir)?;
    let index = SqliteIndex::open(&config.index_path())?;
    let summary = export_all(config, &index).context("failed to read the account index")?;

    if summary.failed > 0 {
        export_warn!(
            "{} of {} notes failed to export",
            summary.failed,
            summary.processed
        );
    }

    if let Some(report) = &plan.report {
        match write_report(report, &summary) {
            Ok(path) => export_info!("Wrote report to {:?}", path),
            Err(err) => export_error!("Failed to write report to {:?}: {}", report, err),
        }
    }
    Ok(())
}

fn run_list_accounts(data_dir: Option<PathBuf>, file_settings: FileSettings) -> Result<()> {
    let data_dir = resolve_data_dir(data_dir, file_settings.data_dir, default_data_dir())?;
    export_info!("Listing accounts in {:?}", data_dir);
    for account in accounts::list_accounts(&data_dir)? {
        println!("{account}");
    }
    Ok(())
}
