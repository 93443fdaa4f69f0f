use anyhow::Result;

use super::check::check_run_file;
use super::template;

/// Execute CLI commands
pub fn execute_command(cli: &super::Cli) -> Result<()> {
    use super::Commands;

    match &cli.command {
        Commands::Check { config, format } => {
            check_run_file(config, format)?;
        }
        Commands::Template { output } => {
            template::generate_run_template(output.as_deref())?;
        }
    }

    Ok(())
}
