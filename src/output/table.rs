use crate::classify;
use crate::model::Severity;
use crate::output::{CompareReport, OutputFormatter};
use colored::Colorize;
use std::io::Write;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn level_tag(severity: Severity) -> String {
    match severity {
        Severity::Major => "major".red().bold().to_string(),
        Severity::Minor => "minor".yellow().to_string(),
        Severity::Patch => "patch".green().to_string(),
        Severity::None => "none".dimmed().to_string(),
    }
}

impl OutputFormatter for TableOutput {
    fn format<W: Write>(&self, report: &CompareReport, writer: &mut W) -> std::io::Result<()> {
        if report.changes.is_empty() {
            writeln!(writer, "{}", "No public API changes detected.".green())?;
            return Ok(());
        }

        writeln!(writer, "Public API changes")?;
        writeln!(writer, "{}", "=".repeat(90))?;
        writeln!(
            writer,
            "{:<8} | {:<26} | {:<36} | Detail",
            "Level", "Kind", "Path"
        )?;
        writeln!(writer, "{}", "-".repeat(90))?;

        // Most severe first; records are already path-ordered within a level.
        let mut rows: Vec<_> = report.changes.iter().collect();
        rows.sort_by(|a, b| {
            classify::severity_of(b.kind)
                .cmp(&classify::severity_of(a.kind))
                .then(a.path.cmp(&b.path))
        });

        for change in rows {
            let severity = classify::severity_of(change.kind);
            writeln!(
                writer,
                "{:<8} | {:<26} | {:<36} | {}",
                level_tag(severity),
                change.kind.to_string(),
                change.path.to_string(),
                change.describe()
            )?;
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "Recommended minimum bump: {}",
            level_tag(report.severity)
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChangeKind, ChangePath, ChangeRecord};

    #[test]
    fn empty_report_prints_the_all_clear() {
        let report = CompareReport::new(Vec::new(), Severity::None, Vec::new(), Vec::new());
        let mut buffer = Vec::new();
        TableOutput::new().format(&report, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("No public API changes detected."));
    }

    #[test]
    fn major_changes_sort_before_minor_ones() {
        let changes = vec![
            ChangeRecord::new(
                ChangeKind::FunctionAdded,
                ChangePath::symbol("api.added"),
                None,
                None,
            ),
            ChangeRecord::new(
                ChangeKind::FunctionRemoved,
                ChangePath::symbol("api.removed"),
                None,
                None,
            ),
        ];
        let report = CompareReport::new(changes, Severity::Major, Vec::new(), Vec::new());
        let mut buffer = Vec::new();
        TableOutput::new().format(&report, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let removed_at = text.find("api.removed").unwrap();
        let added_at = text.find("api.added").unwrap();
        assert!(removed_at < added_at);
        assert!(text.contains("Recommended minimum bump:"));
    }
}
