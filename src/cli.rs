use crate::model::Bump;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "apigate")]
#[command(about = "Detect breaking public API changes and enforce semver")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compare two source trees and report all public API changes
    Compare(CompareArgs),

    /// Gate a release: fail if changes exceed the declared bump level
    Gate(GateArgs),

    /// Extract a surface and save it as a baseline snapshot
    Snapshot(SnapshotArgs),

    /// Generate a starter .apigate.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CompareArgs {
    /// Old version: source directory or saved snapshot (.json)
    pub old: PathBuf,

    /// New version: source directory or saved snapshot (.json)
    pub new: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Abort on the first file that fails to parse
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct GateArgs {
    /// Old version: source directory or saved snapshot (.json)
    pub old: PathBuf,

    /// New version: source directory or saved snapshot (.json)
    pub new: PathBuf,

    /// Declared bump for this release
    #[arg(short, long, value_enum)]
    pub declared: Bump,

    /// Output format for the change report
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Abort on the first file that fails to parse
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SnapshotArgs {
    /// Save snapshot to this file
    #[arg(long)]
    pub save: PathBuf,

    /// Path to extract (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Abort on the first file that fails to parse
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Path where to create .apigate.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Sarif,
}
