use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use voxnorm_core::plan::NormalizationPlan;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the plan to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save an example NormalizationPlan as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let toml_str = toml::to_string_pretty(&NormalizationPlan::example())?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write plan to {}", path.display()))?;
        println!("Example plan saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
