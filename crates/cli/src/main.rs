use anyhow::Result;
use clap::Parser;
use glyphtrace_cli::{cli::Cli, init_logging};

fn main() -> Result<()> {
    init_logging();
    Cli::parse().command.run()
}
