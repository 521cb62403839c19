//! YAML Export functionality
//!
//! The same document as the JSON export, for reading by eye.

use std::io::Write;

use crate::error::{TrackerError, TrackerResult};
use crate::export::json::FullExport;
use crate::storage::Database;

/// Export the full database to YAML format
pub fn export_full_yaml<W: Write>(db: &Database, writer: &mut W) -> TrackerResult<()> {
    let export = FullExport::from_database(db)?;
    let counts = export.data.collections.counts();

    let header = format!(
        "# Exam Tracker Full Database Export\n\
         # Generated: {}\n\
         # Format Version: {}\n\
         # Contents: {}, {} backups\n\
         #\n\
         # Import the JSON export to restore; this file is for reading.\n\n",
        export.export_date,
        export.version,
        counts.summary(),
        export.data.backups.len()
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| TrackerError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| TrackerError::Export(e.to_string()))?;

    Ok(())
}
