mod json;
mod sarif;
mod table;

pub use json::JsonOutput;
pub use sarif::SarifOutput;
pub use table::TableOutput;

use crate::extract::ParseError;
use crate::model::{ChangeRecord, Severity};
use std::io::Write;

/// Everything a formatter needs to render one comparison.
pub struct CompareReport {
    pub changes: Vec<ChangeRecord>,
    pub severity: Severity,
    /// Parse failures on each side. An incomplete surface weakens the
    /// verdict, so every format must surface these counts.
    pub failed_old: Vec<ParseError>,
    pub failed_new: Vec<ParseError>,
}

pub trait OutputFormatter {
    fn format<W: Write>(&self, report: &CompareReport, writer: &mut W) -> std::io::Result<()>;
}

impl CompareReport {
    pub fn new(
        changes: Vec<ChangeRecord>,
        severity: Severity,
        failed_old: Vec<ParseError>,
        failed_new: Vec<ParseError>,
    ) -> Self {
        Self {
            changes,
            severity,
            failed_old,
            failed_new,
        }
    }

    pub fn failed_file_count(&self) -> usize {
        self.failed_old.len() + self.failed_new.len()
    }
}
