use clap::Parser;
use pnldesk::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
