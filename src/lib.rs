pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod extract;
pub mod gate;
pub mod model;
pub mod output;
pub mod snapshot;
pub mod style;

pub use cli::Cli;
pub use commands::{cmd_compare, cmd_gate, cmd_init, cmd_snapshot};
pub use config::Config;
pub use diff::{compare_surfaces, diff_surfaces};
pub use extract::{ExtractError, ExtractOptions, Extraction, ParseError, build_surface};
pub use gate::evaluate;
pub use model::{Bump, ChangeKind, ChangeRecord, Severity, Surface, Verdict};
