use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;
use voxnorm_core::normalization::SchemeRegistry;
use voxnorm_core::plan::ChannelNormalizers;

use crate::plan_file::{load_plan, missing_statistics};
use crate::summary::print_plan_summary;

#[derive(Args)]
pub struct CheckArgs {
    /// Normalization plan (TOML)
    pub plan: PathBuf,
}

pub fn run(args: &CheckArgs) -> Result<()> {
    let plan = load_plan(&args.plan)?;
    let registry = SchemeRegistry::new();
    let normalizers = ChannelNormalizers::from_plan(&plan, &registry)?;
    info!(
        channels = normalizers.len(),
        custom_windows = registry.len(),
        "Plan resolved"
    );

    print_plan_summary(&plan, &normalizers);

    let missing = missing_statistics(&plan, &normalizers);
    if !missing.is_empty() {
        anyhow::bail!(
            "Channels without the intensity properties their scheme needs: {}",
            missing.join(", ")
        );
    }

    println!("Plan OK");
    Ok(())
}
