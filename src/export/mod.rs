//! Export module for the exam tracker
//!
//! Provides complete data export functionality in multiple formats:
//! - JSON: the portable full-database document, which can be imported again
//! - YAML: the same document for reading
//! - CSV: one row per chapter (spreadsheet-compatible)

pub mod csv;
pub mod import;
pub mod json;
pub mod yaml;

pub use self::csv::export_chapters_csv;
pub use import::{import_full_database, ImportResult, PRE_IMPORT_BACKUP};
pub use json::{
    csv_file_name, export_full_json, full_export_file_name, import_from_json, ExportData,
    FullExport, EXPORT_FORMAT_VERSION,
};
pub use yaml::export_full_yaml;
