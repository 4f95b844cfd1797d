use crate::cli::{GateArgs, OutputFormat};
use crate::classify;
use crate::output::CompareReport;
use crate::style;

use super::{load_side, warn_failed_files, write_report};

pub fn cmd_gate(args: GateArgs) -> i32 {
    let old = match load_side(&args.old, args.fail_fast) {
        Ok(side) => side,
        Err(code) => return code,
    };
    let new = match load_side(&args.new, args.fail_fast) {
        Ok(side) => side,
        Err(code) => return code,
    };

    let (changes, severity) = crate::diff::compare_surfaces(&old.surface, &new.surface);
    let verdict = crate::gate::evaluate(severity, args.declared);
    let report = CompareReport::new(changes, severity, old.errors, new.errors);

    warn_failed_files(&report);

    let code = write_report(&report, args.format, args.output.as_deref());
    if code != 0 {
        return code;
    }

    // The verdict block is for humans; machine formats carry the result in
    // the report plus the exit code.
    if args.format == OutputFormat::Table && args.output.is_none() {
        println!();
        if verdict.pass {
            style::success(&format!(
                "Gate passed | {} change(s) | declared={} required={}",
                report.changes.len(),
                verdict.declared,
                verdict.severity
            ));
        } else {
            style::blocked(&format!(
                "RELEASE BLOCKED | declared={} required={}",
                verdict.declared, verdict.severity
            ));
            for change in &report.changes {
                if classify::severity_of(change.kind) > verdict.declared.covers() {
                    println!("    {}", change.describe());
                }
            }
        }
    }

    if verdict.pass { 0 } else { 1 }
}
