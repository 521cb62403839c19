//! Class-defaults CLI commands
//!
//! Inspect and reload the per-class templates used when a class is chosen.

use clap::Subcommand;

use crate::error::{TrackerError, TrackerResult};
use crate::models::{DefaultChapter, DefaultChapterId};
use crate::session::Tracker;

use super::parse_arg;

/// Defaults subcommands
#[derive(Subcommand)]
pub enum DefaultsCommands {
    /// List known classes, or one class's lists and template chapters
    Show {
        /// Class name
        class: Option<String>,
    },
    /// Empty the templates and load the defaults document again
    Reload,
    /// Add a template chapter to a class
    AddChapter {
        /// Class name
        class: String,
        /// Subject name
        subject: String,
        /// Chapter number
        number: String,
        /// Chapter name
        name: String,
        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a template chapter
    DeleteChapter {
        /// Template ID (e.g. dch-2 or 2)
        id: String,
    },
}

/// Handle a defaults command
pub fn handle_defaults_command(tracker: &Tracker, cmd: DefaultsCommands) -> TrackerResult<()> {
    let catalog = tracker.catalog();

    match cmd {
        DefaultsCommands::Show { class: None } => {
            let classes = catalog.all_classes()?;
            if classes.is_empty() {
                println!("No class defaults loaded.");
                println!("Load them with: tracker defaults reload");
                return Ok(());
            }

            println!("Known Classes");
            println!("=============");
            for defaults in &classes {
                let templates = catalog.default_chapters_for(&defaults.class_name)?.len();
                println!(
                    "  Class {:<4} {} subjects, {} template chapters",
                    defaults.class_name,
                    defaults.subjects.len(),
                    templates
                );
            }
        }

        DefaultsCommands::Show { class: Some(class) } => {
            let defaults = catalog.class_defaults(&class)?.ok_or_else(|| {
                TrackerError::NotFound {
                    entity_type: "Class defaults",
                    identifier: class.clone(),
                }
            })?;

            println!("Class {}", defaults.class_name);
            println!("  Subjects:          {}", defaults.subjects.join(", "));
            println!("  Learning Methods:  {}", defaults.learning_methods.join(", "));
            println!("  Exam Types:        {}", defaults.exam_types.join(", "));

            let templates = catalog.default_chapters_for(&class)?;
            if !templates.is_empty() {
                println!("  Template Chapters:");
                for t in &templates {
                    println!(
                        "    {:<7} {} - Ch {}: {}",
                        t.id.to_string(),
                        t.subject,
                        t.chapter_no,
                        t.chapter_name
                    );
                }
            }
        }

        DefaultsCommands::Reload => {
            let origin = tracker.reload_defaults()?;
            println!("Class defaults reloaded: {}", origin);
        }

        DefaultsCommands::AddChapter {
            class,
            subject,
            number,
            name,
            description,
        } => {
            let mut template = DefaultChapter::new(class, subject, number, name);
            template.description = description;
            let stored = catalog.add_default_chapter(template)?;
            println!(
                "Added template {} to class {}",
                stored.id, stored.class_name
            );
        }

        DefaultsCommands::DeleteChapter { id } => {
            let id: DefaultChapterId = parse_arg("template ID", &id)?;
            if !catalog.delete_default_chapter(id)? {
                return Err(TrackerError::NotFound {
                    entity_type: "Template chapter",
                    identifier: id.to_string(),
                });
            }
            println!("Deleted template {}", id);
        }
    }

    Ok(())
}
