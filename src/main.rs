use apigate::cli::{Cli, Command};
use apigate::{cmd_compare, cmd_gate, cmd_init, cmd_snapshot};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Compare(args) => cmd_compare(args),
        Command::Gate(args) => cmd_gate(args),
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::Init(args) => cmd_init(args),
    };

    std::process::exit(exit_code);
}
