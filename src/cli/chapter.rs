//! Chapter CLI commands
//!
//! Implements CLI commands for tracking chapters: listing, editing fields,
//! recording learning progress and the CSV export.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Subcommand;

use crate::display::{format_chapter_details, format_chapter_list};
use crate::error::{TrackerError, TrackerResult};
use crate::export::csv_file_name;
use crate::models::{
    ChapterDraft, ChapterId, Confidence, ConfigKey, LearningStatus, WritingStatus,
};
use crate::services::{today, ChapterFilter};
use crate::session::Tracker;

use super::parse_arg;

/// Chapter subcommands
#[derive(Subcommand)]
pub enum ChapterCommands {
    /// List chapters
    List {
        /// Only chapters of this subject
        #[arg(short, long)]
        subject: Option<String>,
        /// Only chapters tagged with this exam type
        #[arg(short, long)]
        exam: Option<String>,
    },
    /// Show one chapter
    Show {
        /// Chapter ID (e.g. ch-3 or 3)
        id: String,
    },
    /// Add a chapter
    Add {
        /// Subject name
        #[arg(short, long, default_value = "")]
        subject: String,
        /// Chapter number
        #[arg(short, long, default_value = "")]
        number: String,
        /// Chapter name
        #[arg(default_value = "")]
        name: String,
        /// Exam type tag (repeatable)
        #[arg(short, long)]
        exam: Vec<String>,
        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Edit chapter fields
    Set {
        /// Chapter ID
        id: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Replace the exam type tags (repeatable)
        #[arg(long)]
        exam: Vec<String>,
        /// Remove every exam type tag
        #[arg(long, conflicts_with = "exam")]
        no_exams: bool,
        /// Writing practice (no, partial, yes)
        #[arg(long)]
        writing: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Set a learning method's status
    Status {
        /// Chapter ID
        id: String,
        /// Learning method name
        method: String,
        /// Not Started, In Progress, Completed or N/A
        status: String,
    },
    /// Set the confidence level
    Confidence {
        /// Chapter ID
        id: String,
        /// None, Low, Medium, Good or Excellent
        level: String,
    },
    /// Delete a chapter
    Delete {
        /// Chapter ID
        id: String,
    },
    /// Rename a subject on every chapter that uses it
    RenameSubject { old: String, new: String },
    /// List chapters whose subject is no longer configured
    Orphans,
    /// Export chapters to CSV
    ExportCsv {
        /// Output file (defaults to a dated file in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a chapter command
pub fn handle_chapter_command(tracker: &Tracker, cmd: ChapterCommands) -> TrackerResult<()> {
    let service = tracker.chapters();

    match cmd {
        ChapterCommands::List { subject, exam } => {
            let mut filter = ChapterFilter::new();
            if let Some(subject) = subject {
                filter = filter.subject(subject);
            }
            if let Some(exam) = exam {
                filter = filter.exam_type(exam);
            }

            let chapters = service.list_filtered(&filter)?;
            let methods = tracker.config().learning_methods()?;
            print!("{}", format_chapter_list(&chapters, &methods));
        }

        ChapterCommands::Show { id } => {
            let id: ChapterId = parse_arg("chapter ID", &id)?;
            let chapter = service
                .get(id)?
                .ok_or_else(|| TrackerError::chapter_not_found(id.to_string()))?;
            let methods = tracker.config().learning_methods()?;
            print!("{}", format_chapter_details(&chapter, &methods));
        }

        ChapterCommands::Add {
            subject,
            number,
            name,
            exam,
            notes,
        } => {
            let chapter = service.add_chapter_with(ChapterDraft {
                subject,
                chapter_no: number,
                chapter_name: name,
                exam_types: exam.into_iter().collect(),
                notes,
            })?;
            println!("Added chapter: {}", chapter.label());
            println!("  ID: {}", chapter.id);
        }

        ChapterCommands::Set {
            id,
            subject,
            number,
            name,
            exam,
            no_exams,
            writing,
            notes,
        } => {
            let id: ChapterId = parse_arg("chapter ID", &id)?;
            if service.get(id)?.is_none() {
                return Err(TrackerError::chapter_not_found(id.to_string()));
            }

            let mut changed = false;
            if let Some(subject) = subject {
                service.set_subject(id, &subject)?;
                changed = true;
            }
            if let Some(number) = number {
                service.set_chapter_no(id, &number)?;
                changed = true;
            }
            if let Some(name) = name {
                service.set_chapter_name(id, &name)?;
                changed = true;
            }
            if no_exams || !exam.is_empty() {
                let tags: BTreeSet<String> = exam.into_iter().collect();
                service.set_exam_types(id, tags)?;
                changed = true;
            }
            if let Some(writing) = writing {
                let writing: WritingStatus = parse_arg("writing status", &writing)?;
                service.set_writing_done(id, writing)?;
                changed = true;
            }
            if let Some(notes) = notes {
                service.set_notes(id, &notes)?;
                changed = true;
            }

            if !changed {
                println!("No changes specified. Use --help to see the editable fields.");
                return Ok(());
            }

            if let Some(chapter) = service.get(id)? {
                println!("Updated chapter: {}", chapter.label());
            }
        }

        ChapterCommands::Status { id, method, status } => {
            let id: ChapterId = parse_arg("chapter ID", &id)?;
            let status: LearningStatus = parse_arg("learning status", &status)?;

            let chapter = service
                .set_learning_status(id, &method, status)?
                .ok_or_else(|| TrackerError::chapter_not_found(id.to_string()))?;
            println!("{}: {} is now {}", chapter.label(), method, status);
        }

        ChapterCommands::Confidence { id, level } => {
            let id: ChapterId = parse_arg("chapter ID", &id)?;
            let level: Confidence = parse_arg("confidence level", &level)?;

            let chapter = service
                .set_confidence(id, level)?
                .ok_or_else(|| TrackerError::chapter_not_found(id.to_string()))?;
            println!("{}: confidence is now {}", chapter.label(), chapter.confidence);
        }

        ChapterCommands::Delete { id } => {
            let id: ChapterId = parse_arg("chapter ID", &id)?;
            if !service.delete(id)? {
                return Err(TrackerError::chapter_not_found(id.to_string()));
            }
            println!("Deleted chapter {}", id);
        }

        ChapterCommands::RenameSubject { old, new } => {
            let updated = service.rename_subject(&old, &new)?;
            println!("Renamed '{}' to '{}' on {} chapter(s)", old, new, updated);
        }

        ChapterCommands::Orphans => {
            let subjects = tracker.config().get(ConfigKey::Subjects)?;
            let orphans = service.orphaned_chapters(&subjects)?;

            if orphans.is_empty() {
                println!("Every chapter belongs to a configured subject.");
                return Ok(());
            }

            for (subject, chapters) in &orphans {
                println!("{} ({} chapter(s), not in the subject list)", subject, chapters.len());
                for chapter in chapters {
                    println!("  {}  {}", chapter.id, chapter.label());
                }
            }
        }

        ChapterCommands::ExportCsv { output } => {
            let output = match output {
                Some(path) => path,
                None => {
                    let name = tracker.student().profile()?.name;
                    PathBuf::from(csv_file_name(&name, today()))
                }
            };

            let file = File::create(&output).map_err(|e| {
                TrackerError::Export(format!(
                    "Failed to create file {}: {}",
                    output.display(),
                    e
                ))
            })?;

            let rows = tracker.export_csv(BufWriter::new(file))?;
            println!("Exported {} chapter(s) to: {}", rows, output.display());
        }
    }

    Ok(())
}
