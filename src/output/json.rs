use crate::classify;
use crate::model::{ChangeKind, Severity};
use crate::output::{CompareReport, OutputFormatter};
use serde::Serialize;
use std::io::Write;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    changes: Vec<JsonChange<'a>>,
    severity: Severity,
    failed_files: FailedFiles,
}

#[derive(Serialize)]
struct JsonChange<'a> {
    kind: ChangeKind,
    path: String,
    previous: Option<&'a str>,
    new: Option<&'a str>,
    severity: Severity,
    detail: String,
}

#[derive(Serialize)]
struct FailedFiles {
    old: usize,
    new: usize,
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, report: &CompareReport, writer: &mut W) -> std::io::Result<()> {
        let json_report = JsonReport {
            changes: report
                .changes
                .iter()
                .map(|c| JsonChange {
                    kind: c.kind,
                    path: c.path.to_string(),
                    previous: c.previous.as_deref(),
                    new: c.new.as_deref(),
                    severity: classify::severity_of(c.kind),
                    detail: c.describe(),
                })
                .collect(),
            severity: report.severity,
            failed_files: FailedFiles {
                old: report.failed_old.len(),
                new: report.failed_new.len(),
            },
        };

        let json = serde_json::to_string_pretty(&json_report)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChangePath, ChangeRecord};

    #[test]
    fn report_serializes_changes_and_severity() {
        let changes = vec![ChangeRecord::new(
            ChangeKind::ReturnTypeChanged,
            ChangePath::symbol("api.count"),
            Some("int".to_string()),
            Some("str".to_string()),
        )];
        let report = CompareReport::new(changes, Severity::Major, Vec::new(), Vec::new());

        let mut buffer = Vec::new();
        JsonOutput::new().format(&report, &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["severity"], "major");
        assert_eq!(value["changes"][0]["kind"], "return_type_changed");
        assert_eq!(value["changes"][0]["path"], "api.count");
        assert_eq!(value["changes"][0]["previous"], "int");
        assert_eq!(value["changes"][0]["new"], "str");
        assert_eq!(value["failed_files"]["old"], 0);
    }
}
