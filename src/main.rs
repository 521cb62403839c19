use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exam_tracker::cli::{
    handle_backup_command, handle_chapter_command, handle_defaults_command,
    handle_export_command, handle_import_command, handle_list_command, handle_student_command,
    handle_task_command, BackupCommands, ChapterCommands, DefaultsCommands, ExportCommands,
    ListCommands, StudentCommands, TaskCommands,
};
use exam_tracker::config::TrackerPaths;
use exam_tracker::migration::MigrationOutcome;
use exam_tracker::models::ConfigKey;
use exam_tracker::{StartupReport, Tracker};

/// Environment variable holding the log filter
const LOG_ENV: &str = "TRACKER_LOG";

#[derive(Parser)]
#[command(
    name = "tracker",
    version,
    about = "Local-first exam preparation tracker",
    long_about = "Tracks chapter-by-chapter exam preparation across learning methods, \
                  plans daily study tasks and keeps snapshot backups of everything, \
                  all stored in a local data directory."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chapter tracking commands
    #[command(subcommand, alias = "ch")]
    Chapter(ChapterCommands),

    /// Subject list commands
    #[command(subcommand)]
    Subject(ListCommands),

    /// Learning method list commands
    #[command(subcommand)]
    Method(ListCommands),

    /// Exam type list commands
    #[command(subcommand)]
    Exam(ListCommands),

    /// Student profile commands
    #[command(subcommand)]
    Student(StudentCommands),

    /// Daily plan commands
    #[command(subcommand)]
    Task(TaskCommands),

    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Export data to a file
    #[command(subcommand)]
    Export(ExportCommands),

    /// Replace all data with a JSON export
    Import {
        /// Path to the export file
        file: std::path::PathBuf,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Class defaults commands
    #[command(subcommand)]
    Defaults(DefaultsCommands),

    /// Delete progress data (a backup is taken first)
    Reset {
        /// Also delete every chapter and reset the lists to a starter set
        #[arg(long)]
        all: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show the most recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let paths = TrackerPaths::new()?;
    let (tracker, report) = Tracker::open(paths)?;
    print_startup_notices(&report);

    match cli.command {
        Some(Commands::Chapter(cmd)) => handle_chapter_command(&tracker, cmd)?,
        Some(Commands::Subject(cmd)) => handle_list_command(&tracker, ConfigKey::Subjects, cmd)?,
        Some(Commands::Method(cmd)) => {
            handle_list_command(&tracker, ConfigKey::LearningMethods, cmd)?
        }
        Some(Commands::Exam(cmd)) => handle_list_command(&tracker, ConfigKey::ExamTypes, cmd)?,
        Some(Commands::Student(cmd)) => handle_student_command(&tracker, cmd)?,
        Some(Commands::Task(cmd)) => handle_task_command(&tracker, cmd)?,
        Some(Commands::Backup(cmd)) => handle_backup_command(&tracker, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&tracker, cmd)?,
        Some(Commands::Import { file, force }) => handle_import_command(&tracker, file, force)?,
        Some(Commands::Defaults(cmd)) => handle_defaults_command(&tracker, cmd)?,
        Some(Commands::Reset { all, force }) => handle_reset(&tracker, all, force)?,
        Some(Commands::Audit { count }) => {
            let entries = tracker.db().audit().read_recent(count)?;
            if entries.is_empty() {
                println!("No audit entries yet.");
            }
            for entry in &entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Config) => {
            let paths = tracker.paths();
            let settings = tracker.settings();

            println!("Exam Tracker Configuration");
            println!("==========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup store:     {}", paths.backups_file().display());
            println!("Legacy document:  {}", paths.legacy_document().display());
            println!(
                "Defaults document: {}",
                settings.defaults_document_path(paths).display()
            );
            println!();
            println!("Settings:");
            println!("  Backup retention:      {}", settings.backup_retention);
            println!(
                "  Auto backup interval:  {} hour(s)",
                settings.auto_backup_interval_hours
            );
            println!(
                "  Export reminder:       every {} day(s)",
                settings.export_reminder_days
            );
            println!("  CSV date format:       {}", settings.date_format);
        }
        None => {
            println!("Exam Tracker - local-first exam preparation tracker");
            println!();
            println!("Run 'tracker --help' for usage information.");
            println!("Run 'tracker chapter list' to see your chapters.");
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays clean
fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("exam_tracker=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_startup_notices(report: &StartupReport) {
    if let MigrationOutcome::Migrated { counts, checkpoint } = &report.migration {
        eprintln!("Imported data from the previous version: {}", counts.summary());
        eprintln!("A checkpoint backup was saved as {}.", checkpoint);
    }
    if let Some(error) = &report.migration_error {
        eprintln!("Warning: previous-version data could not be imported: {}", error);
    }
    if report.export_reminder_due {
        eprintln!("Reminder: export your data regularly with 'tracker export json'.");
    }
}

fn handle_reset(tracker: &Tracker, all: bool, force: bool) -> Result<()> {
    if !force {
        if all {
            println!("WARNING: This deletes every chapter and resets the lists to a starter set!");
        } else {
            println!("WARNING: This deletes all chapters, daily plans and history!");
            println!("The student profile and the lists are kept.");
        }
        println!("A backup of the current data is taken first.");
        println!();
        println!("To proceed, run again with --force flag:");
        println!("  tracker reset{} --force", if all { " --all" } else { "" });
        return Ok(());
    }

    let backup = if all {
        tracker.clear_all()?
    } else {
        tracker.reset_progress()?
    };
    println!("Done. Previous data saved as backup {}.", backup.id);
    Ok(())
}
