//! CLI commands for data export and import
//!
//! Full-database exports in JSON (importable) or YAML (for reading), and
//! the JSON import that replaces the live data.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::error::{TrackerError, TrackerResult};
use crate::export::{full_export_file_name, import_from_json};
use crate::services::today;
use crate::session::Tracker;

/// Full-database export formats
#[derive(Debug, Clone, Copy)]
enum ExportFormat {
    Json,
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export all data as JSON (can be imported again)
    Json {
        /// Output file path (defaults to a dated file in the current directory)
        output: Option<PathBuf>,
    },

    /// Export all data as YAML (for reading)
    Yaml {
        /// Output file path (defaults to a dated file in the current directory)
        output: Option<PathBuf>,
    },

    /// Show what an export would contain without writing files
    Info,
}

/// Handle export commands
pub fn handle_export_command(tracker: &Tracker, cmd: ExportCommands) -> TrackerResult<()> {
    match cmd {
        ExportCommands::Json { output } => handle_export_all(tracker, output, ExportFormat::Json),
        ExportCommands::Yaml { output } => handle_export_all(tracker, output, ExportFormat::Yaml),
        ExportCommands::Info => handle_export_info(tracker),
    }
}

fn handle_export_all(
    tracker: &Tracker,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> TrackerResult<()> {
    let output = match output {
        Some(path) => path,
        None => {
            let name = tracker.student().profile()?.name;
            let file_name = full_export_file_name(&name, today());
            match format {
                ExportFormat::Json => PathBuf::from(file_name),
                ExportFormat::Yaml => PathBuf::from(file_name).with_extension("yaml"),
            }
        }
    };

    let file = File::create(&output).map_err(|e| {
        TrackerError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Json => tracker.export_json(&mut writer)?,
        ExportFormat::Yaml => {
            tracker.export_yaml(&mut writer)?;
            println!("Note: YAML exports are for reading; import accepts JSON only.");
        }
    }
    writer
        .flush()
        .map_err(|e| TrackerError::Export(format!("Failed to write {}: {}", output.display(), e)))?;

    println!("Full database exported to: {}", output.display());
    Ok(())
}

fn handle_export_info(tracker: &Tracker) -> TrackerResult<()> {
    let counts = tracker.db().snapshot()?.counts();
    let backups = tracker.backups().list_backups()?.len();

    println!("Export Contents");
    println!("===============");
    println!("  Chapters:       {}", counts.chapters);
    println!("  Profile:        {}", counts.student_info);
    println!("  Lists:          {}", counts.config_lists);
    println!("  Daily tasks:    {}", counts.daily_tasks);
    println!("  History days:   {}", counts.history_days);
    println!("  Backups:        {}", backups);
    Ok(())
}

/// Replace all data with the contents of a JSON export
pub fn handle_import_command(tracker: &Tracker, file: PathBuf, force: bool) -> TrackerResult<()> {
    let contents = fs::read_to_string(&file).map_err(|e| {
        TrackerError::Import(format!("Failed to read {}: {}", file.display(), e))
    })?;

    // Validate up front so a bad file is reported before the prompt
    let document = import_from_json(&contents)?;
    let counts = document.data.collections.counts();

    println!("Import Preview");
    println!("==============");
    println!("  Exported:  {}", document.export_date.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Contains:  {}", counts.summary());
    println!("  Backups:   {}", document.data.backups.len());
    println!();

    if !force {
        println!("WARNING: Importing will replace all current data!");
        println!("A safety backup of the current data is taken first.");
        println!();
        println!("To proceed, run again with --force flag:");
        println!("  tracker import {} --force", file.display());
        return Ok(());
    }

    let result = tracker.import_json(&contents)?;
    println!("Import complete.");
    println!("  {}", result.summary());
    println!("  Safety backup: {}", result.safety_backup);
    if result.backups_skipped > 0 {
        println!("  Skipped {} backup(s) already in the store", result.backups_skipped);
    }
    if result.backups_pruned > 0 {
        println!("  Pruned {} old backup(s)", result.backups_pruned);
    }
    Ok(())
}
