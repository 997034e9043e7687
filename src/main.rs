//! catir - Camera Trap Image Renamer.
//!
//! Usage:
//!   catir [OPTIONS] <INPUT>...     Rename images after their EXIF capture time
//!   catir -t -r <DIR>              Dry run over a whole tree
//!   catir --help                   Show help

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use itertools::Itertools;

use catir_core::{FileConfig, RenameConfig, RenameConfigBuilder, Verbosity};
use catir_exif::{ExifExtractor, ExifOptions};
use catir_ops::{Driver, RunEvent, SkipEntry, start_run};

/// Exit status when at least one file was skipped.
const EXIT_SKIPPED: u8 = 1;
/// Exit status for configuration and other fatal errors.
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(
    name = "catir",
    version,
    about = "Rename camera trap images after their EXIF capture time",
    long_about = "catir renames images to <deployment>_<template>.<FORMAT>, where the \
                  template is filled from EXIF data. Name collisions are resolved by \
                  bumping the seconds.\n\n\
                  Template tokens: {YYYY} {MM} {DD} {hh} {mm} {ss} {Artist} {Make} {Model} \
                  {Folder} {Seq}. Use {{ and }} for literal braces."
)]
struct Cli {
    /// Files or directories to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Starting sequence number for {Seq}
    #[arg(short, long = "sequence", allow_negative_numbers = true)]
    sequence: Option<i64>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Include hidden files and directories
    #[arg(short, long)]
    include_hidden: bool,

    /// Report the new names without renaming anything
    #[arg(short = 't', long = "test", visible_alias = "dry-run")]
    test: bool,

    /// Filename prefix (derived from the path when omitted)
    #[arg(long)]
    deployment_name: Option<String>,

    /// Filename template [default: {YYYY}-{MM}-{DD}_{hh}-{mm}-{ss}]
    #[arg(long, value_name = "TEMPLATE")]
    timestamp_format: Option<String>,

    /// Print full old and new paths
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Print only folder progress and fatal errors
    #[arg(short, long)]
    quiet: bool,

    /// Config file (defaults to <config dir>/catir/config.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip images whose EXIF block is partially corrupt instead of reading what is there
    #[arg(long)]
    strict_exif: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Flags given on the command line override file values.
    fn apply_to(&self, builder: &mut RenameConfigBuilder) {
        if let Some(start) = self.sequence {
            builder.sequence_start(start);
        }
        if self.recursive {
            builder.recursive(true);
        }
        if self.include_hidden {
            builder.include_hidden(true);
        }
        if self.test {
            builder.dry_run(true);
        }
        if let Some(ref name) = self.deployment_name {
            builder.deployment_name(name.clone());
        }
        if let Some(ref format) = self.timestamp_format {
            builder.timestamp_format(format.clone());
        }
        builder.verbosity(self.verbosity());
    }

    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("Failed to install error handler: {err}");
    }
    logging::init_logger();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(report) => {
            eprintln!("Error: {report:?}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file_config = match cli.config {
        Some(ref path) => Some(FileConfig::load(path)?),
        None => FileConfig::load_default()?,
    };

    let mut builder = RenameConfig::builder();
    if let Some(ref file_config) = file_config {
        file_config.apply_to(&mut builder);
    }
    cli.apply_to(&mut builder);
    let config = builder.build().wrap_err("Invalid configuration")?;

    let strict = cli.strict_exif
        || file_config
            .as_ref()
            .and_then(|c| c.strict_exif)
            .unwrap_or(false);
    let options = if strict {
        ExifOptions::strict()
    } else {
        ExifOptions::default()
    };

    let printer = Printer::new(config.verbosity);
    let driver = Driver::new(config, ExifExtractor::with_options(options))?;
    let mut rx = start_run(driver, cli.inputs);

    let mut summary = None;
    let mut skipped = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::Finished(s) => summary = Some(s),
            RunEvent::Failed(message) => {
                printer.print_skipped(&skipped);
                return Err(eyre!(message));
            }
            RunEvent::Skipped(entry) => skipped.push(entry),
            other => printer.print(&other),
        }
    }
    let summary = summary.ok_or_else(|| eyre!("Run ended without a summary"))?;

    printer.print_skipped(&summary.skipped);
    if printer.verbosity != Verbosity::Quiet && !summary.walk_warnings.is_empty() {
        eprintln!("{} warning(s) while walking inputs:", summary.walk_warnings.len());
        for warning in &summary.walk_warnings {
            eprintln!("  {}: {}", warning.path.display(), warning.message);
        }
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(if summary.has_skips() {
        ExitCode::from(EXIT_SKIPPED)
    } else {
        ExitCode::SUCCESS
    })
}

/// Renders run events as the rename report on stdout.
struct Printer {
    verbosity: Verbosity,
}

impl Printer {
    fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Report lines for one event. Quiet runs keep the folder lines and
    /// drop per-file output.
    fn lines(&self, event: &RunEvent) -> Vec<String> {
        let quiet = self.verbosity == Verbosity::Quiet;
        match event {
            RunEvent::DirectoryStarted { dir } => {
                vec![format!("Processing folder: {}", dir.display())]
            }
            RunEvent::DirectoryFinished { .. } => vec![String::new()],
            RunEvent::Collision(_) | RunEvent::Renamed(_) if quiet => Vec::new(),
            RunEvent::Collision(step) => vec![
                format!("Duplicate file found: {}", step.existing.display()),
                format!("Renaming file to: {}", step.next.display()),
            ],
            RunEvent::Renamed(plan) => match self.verbosity {
                Verbosity::Verbose => vec![format!(
                    "{} --> {}",
                    plan.old_path.display(),
                    plan.new_path.display()
                )],
                _ => vec![format!("{} --> {}", plan.old_file_name(), plan.new_base)],
            },
            RunEvent::Skipped(_) | RunEvent::Finished(_) | RunEvent::Failed(_) => Vec::new(),
        }
    }

    fn print(&self, event: &RunEvent) {
        for line in self.lines(event) {
            println!("{line}");
        }
    }

    fn skipped_report(&self, skipped: &[SkipEntry]) -> Option<String> {
        if self.verbosity == Verbosity::Quiet || skipped.is_empty() {
            return None;
        }
        Some(format!("\nSkipped Files:\n\t{}", skipped.iter().join("\n\t")))
    }

    fn print_skipped(&self, skipped: &[SkipEntry]) {
        if let Some(report) = self.skipped_report(skipped) {
            println!("{report}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catir_core::{DEFAULT_TIMESTAMP_FORMAT, SkipReason};
    use catir_ops::{CollisionStep, RenamePlan};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_overrides_file_config() {
        let cli = Cli::parse_from([
            "catir",
            "-s",
            "-5",
            "-r",
            "-t",
            "--deployment-name",
            "KLN",
            "photos",
        ]);
        let file = FileConfig {
            sequence_start: Some(10),
            deployment_name: Some("OTHER".into()),
            include_hidden: Some(true),
            ..FileConfig::default()
        };

        let mut builder = RenameConfig::builder();
        file.apply_to(&mut builder);
        cli.apply_to(&mut builder);
        let config = builder.build().unwrap();

        assert_eq!(config.sequence_start, -5);
        assert_eq!(config.deployment_name.as_deref(), Some("KLN"));
        assert!(config.recursive);
        assert!(config.include_hidden);
        assert!(config.dry_run);
        assert_eq!(config.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
    }

    #[test]
    fn test_dry_run_alias_and_verbosity() {
        let cli = Cli::parse_from(["catir", "--dry-run", "-q", "a", "b"]);
        assert!(cli.test);
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
        assert_eq!(cli.inputs.len(), 2);

        assert!(Cli::try_parse_from(["catir", "-v", "-q", "a"]).is_err());
        assert!(Cli::try_parse_from(["catir"]).is_err());
    }

    fn rename_event() -> RunEvent {
        RunEvent::Renamed(RenamePlan {
            old_path: PathBuf::from("/data/DCIM/IMG_0001.JPG"),
            new_path: PathBuf::from("/data/DCIM/KLN_2023-04-05_06-07-08.JPEG"),
            new_base: "2023-04-05_06-07-08.JPEG".to_string(),
            sequence: 1,
            dry_run: false,
        })
    }

    #[test]
    fn test_printer_normal_lines() {
        let printer = Printer::new(Verbosity::Normal);
        let dir = PathBuf::from("/data/DCIM");

        assert_eq!(
            printer.lines(&RunEvent::DirectoryStarted { dir: dir.clone() }),
            vec!["Processing folder: /data/DCIM"]
        );
        assert_eq!(
            printer.lines(&rename_event()),
            vec!["IMG_0001.JPG --> 2023-04-05_06-07-08.JPEG"]
        );
        let collision = RunEvent::Collision(CollisionStep {
            existing: dir.join("KLN_2023-04-05_06-07-08.JPEG"),
            next: dir.join("KLN_2023-04-05_06-07-09.JPEG"),
        });
        assert_eq!(
            printer.lines(&collision),
            vec![
                "Duplicate file found: /data/DCIM/KLN_2023-04-05_06-07-08.JPEG",
                "Renaming file to: /data/DCIM/KLN_2023-04-05_06-07-09.JPEG",
            ]
        );
        assert_eq!(
            printer.lines(&RunEvent::DirectoryFinished { dir }),
            vec![String::new()]
        );
    }

    #[test]
    fn test_quiet_keeps_folder_lines() {
        let printer = Printer::new(Verbosity::Quiet);
        let dir = PathBuf::from("/data/DCIM");

        assert_eq!(
            printer.lines(&RunEvent::DirectoryStarted { dir: dir.clone() }),
            vec!["Processing folder: /data/DCIM"]
        );
        assert_eq!(
            printer.lines(&RunEvent::DirectoryFinished { dir }),
            vec![String::new()]
        );
        assert!(printer.lines(&rename_event()).is_empty());

        let skipped = [SkipEntry::new("/data/DCIM/a.jpg", SkipReason::NoExifData)];
        assert_eq!(printer.skipped_report(&skipped), None);
    }

    #[test]
    fn test_verbose_rename_line() {
        let printer = Printer::new(Verbosity::Verbose);
        assert_eq!(
            printer.lines(&rename_event()),
            vec!["/data/DCIM/IMG_0001.JPG --> /data/DCIM/KLN_2023-04-05_06-07-08.JPEG"]
        );
    }

    #[test]
    fn test_skipped_report() {
        let printer = Printer::new(Verbosity::Normal);
        assert_eq!(printer.skipped_report(&[]), None);

        let skipped = [
            SkipEntry::new("/data/DCIM/a.jpg", SkipReason::NoExifData),
            SkipEntry::new("/data/DCIM/b.jpg", SkipReason::NoTimestamp),
        ];
        assert_eq!(
            printer.skipped_report(&skipped).unwrap(),
            "\nSkipped Files:\n\t/data/DCIM/a.jpg (No EXIF data found)\n\t\
             /data/DCIM/b.jpg (No timestamp found in image EXIF)"
        );
    }
}
