use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tunnel_embed::cli::{execute_command, Cli};
use tunnel_embed::logging::init_tracing;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_filter())?;

    debug!("tunnel-embed v{}", env!("CARGO_PKG_VERSION"));

    execute_command(&cli)
}
