use crate::cli::SnapshotArgs;
use crate::config::Config;
use crate::snapshot::{Snapshot, save_snapshot};
use crate::style;

pub fn cmd_snapshot(args: SnapshotArgs) -> i32 {
    let resolved = match args.path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            style::error(&format!("Could not resolve path: {}", style::path(&args.path)));
            return 1;
        }
    };

    let config = Config::load(&resolved).unwrap_or_else(|e| {
        style::warning(&format!("Failed to load config: {}. Using defaults.", e));
        Config::default()
    });

    let extraction =
        match crate::extract::build_surface(&resolved, &config.extract_options(args.fail_fast)) {
            Ok(extraction) => extraction,
            Err(e) => {
                style::error(&e.to_string());
                return 1;
            }
        };

    if !extraction.errors.is_empty() {
        style::warning(&format!(
            "{} file(s) failed to parse; the snapshot is incomplete",
            extraction.errors.len()
        ));
    }

    let snapshot = Snapshot::from_extraction(&extraction, &resolved);
    if let Err(e) = save_snapshot(&snapshot, &args.save) {
        style::error(&format!("Failed to save snapshot: {}", e));
        return 1;
    }

    style::success(&format!("Snapshot saved to: {}", style::path(&args.save)));
    style::section("Summary");
    println!(
        "{}",
        style::metric("Modules", snapshot.surface.modules.len())
    );
    println!(
        "{}",
        style::metric("Symbols", snapshot.surface.symbol_count())
    );
    println!(
        "{}",
        style::metric("Parse failures", snapshot.failed_files.len())
    );

    0
}
