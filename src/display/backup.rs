//! Backup display formatting

use crate::backup::ValidationResult;
use crate::models::Backup;

/// Format snapshots as a table, in the order given
pub fn format_backup_list(backups: &[Backup]) -> String {
    if backups.is_empty() {
        return "No backups found.".to_string();
    }

    let id_width = backups
        .iter()
        .map(|b| b.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<id_width$}  {:<19}  {:>8}  {}\n",
        "ID", "Created", "Chapters", "Description",
    ));
    output.push_str(&format!(
        "{:-<id_width$}  {:-<19}  {:->8}  {:-<24}\n",
        "", "", "", "",
    ));

    for backup in backups {
        output.push_str(&format!(
            "{:<id_width$}  {:<19}  {:>8}  {}\n",
            backup.id.to_string(),
            backup.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            backup.data.tracking_data.len(),
            backup.description,
        ));
    }

    output
}

/// Format the summary of one snapshot
pub fn format_backup_details(result: &ValidationResult) -> String {
    let counts = &result.counts;
    let mut output = String::new();

    output.push_str(&format!("Backup: {}\n", result.backup_id));
    output.push_str(&format!("  Description:    {}\n", result.description));
    output.push_str(&format!(
        "  Created:        {}\n",
        result.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("  Chapters:       {}\n", counts.chapters));
    output.push_str(&format!("  Profile:        {}\n", counts.student_info));
    output.push_str(&format!("  Lists:          {}\n", counts.config_lists));
    output.push_str(&format!("  Daily tasks:    {}\n", counts.daily_tasks));
    output.push_str(&format!("  History days:   {}\n", counts.history_days));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackupId, Collections};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_backup_list() {
        let mut backup = Backup::new(
            Utc.with_ymd_and_hms(2026, 2, 1, 9, 5, 0).unwrap(),
            "Auto backup",
            Collections::default(),
        );
        backup.id = BackupId::new(12);

        let output = format_backup_list(&[backup]);
        assert!(output.contains("bk-12"));
        assert!(output.contains("2026-02-01 09:05:00"));
        assert!(output.contains("Auto backup"));
        assert_eq!(format_backup_list(&[]), "No backups found.");
    }
}
