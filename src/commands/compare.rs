use crate::cli::CompareArgs;
use crate::output::CompareReport;

use super::{load_side, warn_failed_files, write_report};

pub fn cmd_compare(args: CompareArgs) -> i32 {
    let old = match load_side(&args.old, args.fail_fast) {
        Ok(side) => side,
        Err(code) => return code,
    };
    let new = match load_side(&args.new, args.fail_fast) {
        Ok(side) => side,
        Err(code) => return code,
    };

    let (changes, severity) = crate::diff::compare_surfaces(&old.surface, &new.surface);
    let report = CompareReport::new(changes, severity, old.errors, new.errors);

    warn_failed_files(&report);
    write_report(&report, args.format, args.output.as_deref())
}
