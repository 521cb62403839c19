//! Audit trail for the exam tracker
//!
//! Chapter and daily-task changes are appended to `audit.log` as one JSON
//! object per line, with the record before and after the change.
//!
//! ```rust,ignore
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::create(EntityType::Chapter, "ch-4", Some(label), &chapter))?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
