//! Command-line entry point.
//!
//! Drives one screen through the same runtime a graphical front end would
//! use and prints the resulting projection as JSON:
//!
//! ```text
//! refdesk list assets --query "msci world" --page 2
//! refdesk list portfolios --sort start_date
//! refdesk list etf-book --isin IE00B4L5Y983 --isin IE00B5BMR087 --millions
//! refdesk upload referential.xlsx
//! ```
//!
//! The exit code is 1 when the final projection carries an error.

#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand, ValueEnum};
use refdesk::app::{ScreenConfig, ScreenState};
use refdesk::domain::SortSpec;
use refdesk::observability::init_tracing;
use refdesk::transport::HttpTransport;
use refdesk::ui::{ListStatus, ViewModel};
use refdesk::upload::{CandidateFile, FileSource, UploadState};
use refdesk::{Config, RefdeskError, Result, ScreenHandle, ScreenRuntime};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "refdesk", version, about = "Query and upload reference data")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML settings file.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Overrides `base_url` from the settings file.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Load a screen and print its view model.
    List {
        #[arg(value_enum)]
        screen: ScreenArg,

        /// Search text, applied after the debounce delay.
        #[arg(long)]
        query: Option<String>,

        /// Sort key; repeating the default key flips its direction.
        #[arg(long)]
        sort: Option<String>,

        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// ISINs for the ETF book screen.
        #[arg(long = "isin", value_name = "ISIN")]
        isins: Vec<String>,

        /// Ask for ETF book amounts in millions.
        #[arg(long)]
        millions: bool,
    },

    /// Upload a spreadsheet to the asset referential.
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScreenArg {
    Portfolios,
    Assets,
    EtfBook,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
        config.validate()?;
    }
    Ok(config)
}

async fn run(command: Command, config: &Config) -> Result<ExitCode> {
    let transport = Arc::new(HttpTransport::from_config(config)?);

    match command {
        Command::List { screen, query, sort, page, isins, millions } => {
            let screen = match screen {
                ScreenArg::Portfolios => ScreenConfig::portfolios(),
                ScreenArg::Assets => ScreenConfig::assets(),
                ScreenArg::EtfBook => ScreenConfig::etf_book(isins, millions),
            };
            let handle = ScreenRuntime::spawn(ScreenState::new(screen, config), transport);
            let vm = list(&handle, query.as_deref(), sort.as_deref(), page).await?;
            handle.shutdown();
            emit(&vm)?;
            Ok(exit_code(&vm))
        }
        Command::Upload { file } => {
            let file = CandidateFile::from_path(&file)?;
            let state = ScreenState::new(ScreenConfig::assets(), config);
            let handle = ScreenRuntime::spawn(state, transport);

            handle.offer_file(file, FileSource::Picker)?;
            let vm = handle.wait_until(|vm| vm.upload.is_terminal()).await?;
            handle.shutdown();
            emit(&vm.upload)?;
            Ok(exit_code(&vm))
        }
    }
}

/// Replays the triggers a user would fire and waits for each to settle.
async fn list(
    handle: &ScreenHandle,
    query: Option<&str>,
    sort: Option<&str>,
    page: u32,
) -> Result<ViewModel> {
    handle.reload()?;
    let mut vm = handle
        .wait_until(|vm| !vm.loading && (vm.status != ListStatus::NotLoaded || vm.error.is_some()))
        .await?;
    if vm.error.is_some() {
        return Ok(vm);
    }

    if let Some(key) = sort {
        let expected = SortSpec::toggled(vm.sort.as_ref(), key);
        handle.sort(key)?;
        vm = handle
            .wait_until(|vm| !vm.loading && vm.sort.as_ref() == Some(&expected))
            .await?;
    }

    if let Some(text) = query.map(str::trim).filter(|t| !t.is_empty()) {
        handle.search(text)?;
        vm = handle
            .wait_until(|vm| {
                let applied = match &vm.status {
                    ListStatus::Filtered { query, .. } | ListStatus::NoRowsFound { query } => {
                        query == text
                    }
                    _ => false,
                };
                !vm.loading && (applied || vm.error.is_some())
            })
            .await?;
    }

    while vm.page_number() < page && vm.can_next && vm.error.is_none() {
        let offset = vm.offset;
        handle.next()?;
        vm = handle
            .wait_until(|vm| !vm.loading && (vm.offset > offset || vm.error.is_some()))
            .await?;
    }

    Ok(vm)
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| RefdeskError::Runtime(format!("cannot serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}

fn exit_code(vm: &ViewModel) -> ExitCode {
    if vm.error.is_some() || matches!(vm.upload, UploadState::Failed { .. }) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
