//! Endbib CLI - EndNote XML to BibTeX converter.

mod config;
mod guard;

use clap::{ArgAction, Parser, Subcommand};
use config::{ConfigError, ConfigFile, OutputConfig};
use endbib::{ConversionResult, ConversionWarning, ConvertOptions, ParseError, mapping};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "endbib")]
#[command(author, version, about = "EndNote XML to BibTeX converter", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./endbib.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an EndNote XML export to BibTeX
    Convert {
        /// Input file (use - for stdin)
        input: PathBuf,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write converted.bib into this directory
        #[arg(short = 'd', long = "dir", conflicts_with = "output")]
        directory: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,

        /// Keep bold, italic and other styles as LaTeX commands
        #[arg(long)]
        styled: bool,

        /// Do not warn about missing required fields
        #[arg(long)]
        quiet_missing: bool,

        /// Write the conversion warnings to this file as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List EndNote reference types and their BibTeX entry types
    Types,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot encode report: {0}")]
    Report(#[from] serde_json::Error),
    #[error("invalid log filter: {0}")]
    LogFilter(String),
    #[error("{} appears to be a log file, not an EndNote XML export", .0.display())]
    LogFileInput(PathBuf),
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),
    #[error("conversion failed: no BibTeX entries generated")]
    NoEntries,
}

/// Warnings report written by `--report`.
#[derive(Serialize)]
struct Report<'a> {
    input: String,
    entries: usize,
    warnings: &'a [ConversionWarning],
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = ConfigFile::discover(cli.config.as_deref())?;

    let log_file = cli.log_file.or_else(|| config.logging.file.clone());
    init_logging(cli.verbose, config.logging.level.as_deref(), log_file.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            directory,
            force,
            styled,
            quiet_missing,
            report,
        } => {
            let options = config
                .convert
                .extract_styled_text(config.convert.extract_styled_text || styled)
                .suppress_missing_field_warnings(
                    config.convert.suppress_missing_field_warnings || quiet_missing,
                );
            let target = output_path(output, directory, &config.output);
            convert(
                &input,
                target.as_deref(),
                &options,
                force,
                report.as_deref(),
                log_file.as_deref(),
            )?;
        }
        Commands::Types => {
            list_types();
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, level: Option<&str>, log_file: Option<&Path>) -> Result<(), CliError> {
    let default = match verbose {
        0 => level.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(default),
    }
    .map_err(|e| CliError::LogFilter(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CliError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            registry
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .init();
        }
        None => registry.with(fmt::layer().with_writer(io::stderr)).init(),
    }
    Ok(())
}

/// Resolve where the BibTeX goes; `None` means stdout.
fn output_path(
    output: Option<PathBuf>,
    directory: Option<PathBuf>,
    config: &OutputConfig,
) -> Option<PathBuf> {
    if let Some(path) = output {
        return (path.as_os_str() != "-").then_some(path);
    }
    directory
        .or_else(|| config.directory.clone())
        .map(|dir| dir.join(&config.file_name))
}

fn convert(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
    force: bool,
    report: Option<&Path>,
    log_file: Option<&Path>,
) -> Result<(), CliError> {
    let bytes = read_input(input)?;
    if input.as_os_str() != "-" && guard::looks_like_log(input, &bytes, log_file) {
        tracing::warn!(path = %input.display(), "refusing log file as input");
        return Err(CliError::LogFileInput(input.to_path_buf()));
    }

    tracing::info!(path = %input.display(), "converting EndNote XML to BibTeX");
    let result = endbib::convert(&bytes, options)?;

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    if let Some(path) = report {
        write_report(path, input, &result)?;
    }
    if result.entries.is_empty() {
        return Err(CliError::NoEntries);
    }

    let bibtex = result.to_bibtex();
    match output {
        Some(path) => {
            write_output(path, &bibtex, force)?;
            eprintln!(
                "converted {} entries to {} ({} warnings)",
                result.entries.len(),
                path.display(),
                result.warnings.len()
            );
        }
        None => io::stdout().write_all(bibtex.as_bytes())?,
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<Vec<u8>, CliError> {
    if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    fs::read(input).map_err(|source| CliError::Read {
        path: input.to_path_buf(),
        source,
    })
}

fn write_output(path: &Path, contents: &str, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::OutputExists(path.to_path_buf()));
    }
    let write_err = |source| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote BibTeX");
    Ok(())
}

fn write_report(path: &Path, input: &Path, result: &ConversionResult) -> Result<(), CliError> {
    let report = Report {
        input: input.display().to_string(),
        entries: result.entries.len(),
        warnings: &result.warnings,
    };
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(path, json + "\n").map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn list_types() {
    println!("EndNote reference types:\n");
    println!("  {:24} {:6} {:14}  REQUIRED FIELDS", "ENDNOTE TYPE", "CODE", "BIBTEX");
    println!("  {:24} {:6} {:14}  ---------------", "------------", "----", "------");

    for mapping in mapping::TYPE_MAPPINGS {
        let codes: Vec<&str> = mapping
            .names
            .iter()
            .copied()
            .filter(|name| name.bytes().all(|b| b.is_ascii_digit()))
            .collect();
        println!(
            "  {:24} {:6} {:14}  {}",
            mapping.name(),
            codes.join(", "),
            mapping.entry_type.as_str(),
            mapping.required.join(", ")
        );
    }

    println!(
        "\nRecords without a ref-type are converted as {}.",
        mapping::DEFAULT_TYPE
    );
}
