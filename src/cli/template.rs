use anyhow::{Context, Result};

use crate::config::RUN_FILE_TEMPLATE;

/// Generate run file template
pub fn generate_run_template(output: Option<&str>) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, RUN_FILE_TEMPLATE)
            .with_context(|| format!("Failed to write run file template to {}", path))?;
        println!("Generated run file template: {}", path);
    } else {
        println!("{}", RUN_FILE_TEMPLATE);
    }

    Ok(())
}
