mod compare;
mod gate;
mod init;
mod snapshot;

pub use compare::cmd_compare;
pub use gate::cmd_gate;
pub use init::cmd_init;
pub use snapshot::cmd_snapshot;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::extract::ParseError;
use crate::model::Surface;
use crate::output::{CompareReport, JsonOutput, OutputFormatter, SarifOutput, TableOutput};
use crate::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One side of a comparison: either a freshly extracted tree or a saved
/// snapshot.
pub(crate) struct Side {
    pub surface: Surface,
    pub errors: Vec<ParseError>,
}

/// Load a comparison side. Fatal problems (unreadable root, bad snapshot,
/// fail-fast parse abort) report to stderr and return exit code 2.
pub(crate) fn load_side(path: &Path, fail_fast: bool) -> Result<Side, i32> {
    if path.extension().is_some_and(|ext| ext == "json") {
        let snapshot = match crate::snapshot::load_snapshot(path) {
            Ok(s) => s,
            Err(e) => {
                style::error(&format!("Failed to load snapshot: {}", e));
                return Err(2);
            }
        };
        // Carry the snapshot's recorded failures into the report so the
        // incomplete-surface warning survives persistence.
        let errors = snapshot
            .failed_files
            .iter()
            .map(|file| ParseError {
                path: PathBuf::from(file),
                message: "unparsed when the snapshot was taken".to_string(),
            })
            .collect();
        return Ok(Side {
            surface: snapshot.surface,
            errors,
        });
    }

    let resolved = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            style::error(&format!("Could not resolve path: {}", style::path(path)));
            return Err(2);
        }
    };

    let config = Config::load(&resolved).unwrap_or_else(|e| {
        style::warning(&format!("Failed to load config: {}. Using defaults.", e));
        Config::default()
    });

    match crate::extract::build_surface(&resolved, &config.extract_options(fail_fast)) {
        Ok(extraction) => Ok(Side {
            surface: extraction.surface,
            errors: extraction.errors,
        }),
        Err(e) => {
            style::error(&e.to_string());
            Err(2)
        }
    }
}

/// An incomplete surface undermines any "no breaking changes" claim, so the
/// failure count is always shown next to the result.
pub(crate) fn warn_failed_files(report: &CompareReport) {
    let count = report.failed_file_count();
    if count > 0 {
        style::warning(&format!(
            "{} file(s) failed to parse; the reported surface is incomplete",
            count
        ));
        for error in report.failed_old.iter().chain(&report.failed_new) {
            style::hint(&error.to_string());
        }
    }
}

pub(crate) fn write_report(
    report: &CompareReport,
    format: OutputFormat,
    output: Option<&Path>,
) -> i32 {
    let mut writer: Box<dyn Write> = match output {
        Some(output_path) => match std::fs::File::create(output_path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                style::error(&format!("Could not create output file: {}", e));
                return 2;
            }
        },
        None => Box::new(io::stdout()),
    };

    let result = match format {
        OutputFormat::Table => TableOutput::new().format(report, &mut writer),
        OutputFormat::Json => JsonOutput::new().format(report, &mut writer),
        OutputFormat::Sarif => SarifOutput::new().format(report, &mut writer),
    };

    if let Err(e) = result {
        style::error(&format!("Failed to write output: {}", e));
        return 2;
    }
    0
}
