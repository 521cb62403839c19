//! CSV Export functionality
//!
//! One row per chapter, with one status column per configured learning
//! method. Every field is quoted.

use std::fmt::Write as _;
use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::{TrackerError, TrackerResult};
use crate::models::Chapter;
use crate::services::ConfigStore;
use crate::storage::Database;

/// Export every chapter to CSV; returns the number of rows written
pub fn export_chapters_csv<W: Write>(
    db: &Database,
    writer: W,
    date_format: &str,
) -> TrackerResult<usize> {
    let methods = ConfigStore::new(db).learning_methods()?;
    let chapters = db.chapters.get_all()?;

    let mut csv_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    let mut header = vec!["Subject", "Chapter No", "Chapter Name", "Exam Types"];
    header.extend(methods.iter().map(String::as_str));
    header.extend(["Writing Done", "Confidence", "Last Updated", "Notes"]);
    csv_writer.write_record(&header).map_err(export_error)?;

    for chapter in &chapters {
        csv_writer
            .write_record(chapter_row(chapter, &methods, date_format)?)
            .map_err(export_error)?;
    }

    csv_writer
        .flush()
        .map_err(|e| TrackerError::Export(e.to_string()))?;
    Ok(chapters.len())
}

fn chapter_row(
    chapter: &Chapter,
    methods: &[String],
    date_format: &str,
) -> TrackerResult<Vec<String>> {
    let mut row = vec![
        chapter.subject.clone(),
        chapter.chapter_no.clone(),
        chapter.chapter_name.clone(),
        chapter
            .exam_types
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; "),
    ];
    row.extend(methods.iter().map(|m| chapter.status_for(m).to_string()));

    let last_updated = match chapter.last_updated {
        Some(t) => {
            let mut rendered = String::new();
            write!(rendered, "{}", t.format(date_format)).map_err(|_| {
                TrackerError::Export(format!("Invalid date format '{}'", date_format))
            })?;
            rendered
        }
        None => "Never".to_string(),
    };
    row.extend([
        chapter.writing_done.to_string(),
        chapter.confidence.to_string(),
        last_updated,
        chapter.notes.clone(),
    ]);
    Ok(row)
}

fn export_error(e: csv::Error) -> TrackerError {
    TrackerError::Export(e.to_string())
}
