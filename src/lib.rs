//! Exam Tracker - local-first progress tracking for a school student
//!
//! This library provides the core functionality for the `tracker` command:
//! chapters with per-method learning progress, a daily plan with completion
//! history, and a snapshot-based backup system, all stored as JSON files in
//! one data directory.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths and settings
//! - `error`: Custom error types
//! - `models`: Core data models (chapters, profile, lists, tasks, snapshots)
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system
//! - `services`: Domain operations and list cascades
//! - `defaults`: Per-class templates
//! - `migration`: One-time import of the legacy single-document data
//! - `backup`: Snapshots, retention and restore
//! - `export`: JSON, YAML and CSV export, JSON import
//! - `session`: The open tracker and its startup sequence
//! - `display`, `cli`: Terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use exam_tracker::config::TrackerPaths;
//! use exam_tracker::Tracker;
//!
//! let (tracker, report) = Tracker::open(TrackerPaths::new()?)?;
//! for chapter in tracker.chapters().list()? {
//!     println!("{}", chapter.label());
//! }
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod display;
pub mod error;
pub mod export;
pub mod migration;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{TrackerError, TrackerResult};
pub use session::{StartupReport, Tracker};
