//! Chapter display formatting
//!
//! Formats chapters for terminal output in table and detail views.

use crate::models::Chapter;

/// Format chapters as a table with one status column per learning method
pub fn format_chapter_list(chapters: &[Chapter], methods: &[String]) -> String {
    if chapters.is_empty() {
        return "No chapters found.".to_string();
    }

    let id_width = chapters
        .iter()
        .map(|c| c.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);

    let subject_width = chapters
        .iter()
        .map(|c| c.subject.len())
        .max()
        .unwrap_or(7)
        .max(7);

    let name_width = chapters
        .iter()
        .map(|c| c.chapter_name.len())
        .max()
        .unwrap_or(4)
        .clamp(4, 40);

    let method_widths: Vec<usize> = methods.iter().map(|m| m.len().max(11)).collect();

    let mut output = String::new();
    output.push_str(&format!(
        "{:<id_width$}  {:<subject_width$}  {:>4}  {:<name_width$}",
        "ID",
        "Subject",
        "No",
        "Name",
    ));
    for (method, width) in methods.iter().zip(&method_widths) {
        output.push_str(&format!("  {:<width$}", method, width = *width));
    }
    output.push_str("  Writing  Confidence\n");

    let rule_width = id_width
        + subject_width
        + name_width
        + 10
        + method_widths.iter().map(|w| w + 2).sum::<usize>()
        + 19;
    output.push_str(&"-".repeat(rule_width));
    output.push('\n');

    for chapter in chapters {
        output.push_str(&format!(
            "{:<id_width$}  {:<subject_width$}  {:>4}  {:<name_width$}",
            chapter.id.to_string(),
            chapter.subject,
            chapter.chapter_no,
            truncate(&chapter.chapter_name, name_width),
        ));
        for (method, width) in methods.iter().zip(&method_widths) {
            output.push_str(&format!(
                "  {:<width$}",
                chapter.status_for(method).as_str(),
                width = *width
            ));
        }
        output.push_str(&format!(
            "  {:<7}  {}\n",
            chapter.writing_done.as_str(),
            chapter.confidence.as_str()
        ));
    }

    output.push_str(&format!("\n{} chapter(s)\n", chapters.len()));
    output
}

/// Format a single chapter's details
pub fn format_chapter_details(chapter: &Chapter, methods: &[String]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Chapter: {}\n", chapter.label()));
    output.push_str(&format!("  ID:             {}\n", chapter.id));
    output.push_str(&format!("  Subject:        {}\n", chapter.subject));
    output.push_str(&format!("  Number:         {}\n", chapter.chapter_no));
    output.push_str(&format!("  Name:           {}\n", chapter.chapter_name));

    let exams = if chapter.exam_types.is_empty() {
        "-".to_string()
    } else {
        chapter
            .exam_types
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    output.push_str(&format!("  Exams:          {}\n", exams));

    output.push_str("  Learning:\n");
    for method in methods {
        output.push_str(&format!(
            "    {:<14}{}\n",
            format!("{}:", method),
            chapter.status_for(method)
        ));
    }

    output.push_str(&format!("  Writing Done:   {}\n", chapter.writing_done));
    output.push_str(&format!("  Confidence:     {}\n", chapter.confidence));
    output.push_str(&format!(
        "  Last Updated:   {}\n",
        chapter
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Never".to_string())
    ));
    if !chapter.notes.is_empty() {
        output.push_str(&format!("  Notes:          {}\n", chapter.notes));
    }

    output
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChapterId, LearningStatus};
    use chrono::Utc;

    fn chapter() -> Chapter {
        let mut chapter = Chapter::blank(&["School".to_string()]);
        chapter.id = ChapterId::new(3);
        chapter.subject = "Science".into();
        chapter.chapter_no = "4".into();
        chapter.chapter_name = "Heat".into();
        chapter.set_learning_status("School", LearningStatus::InProgress, Utc::now());
        chapter
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_chapter_list(&[], &[]), "No chapters found.");
    }

    #[test]
    fn test_list_has_method_columns() {
        let methods = vec!["School".to_string(), "Tuition".to_string()];
        let output = format_chapter_list(&[chapter()], &methods);

        let header = output.lines().next().unwrap();
        assert!(header.contains("School"));
        assert!(header.contains("Tuition"));
        assert!(output.contains("In Progress"));
        assert!(output.contains("Not Started"));
        assert!(output.contains("1 chapter(s)"));
    }

    #[test]
    fn test_details() {
        let output = format_chapter_details(&chapter(), &["School".to_string()]);
        assert!(output.starts_with("Chapter: Science - Ch 4: Heat"));
        assert!(output.contains("ch-3"));
        assert!(output.contains("Exams:          -"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Light", 10), "Light");
        assert_eq!(truncate("The Making of a Global World", 10), "The Mak...");
    }
}
