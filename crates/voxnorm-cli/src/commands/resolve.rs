use anyhow::{Context, Result};
use clap::Args;
use voxnorm_core::normalization::SchemeRegistry;

use crate::summary::print_scheme_table;

#[derive(Args)]
pub struct ResolveArgs {
    /// Channel names (e.g. "CT", "T2", "ct_to_-100_200")
    #[arg(required = true)]
    pub names: Vec<String>,
}

pub fn run(args: &ResolveArgs) -> Result<()> {
    let registry = SchemeRegistry::new();

    let rows = args
        .names
        .iter()
        .map(|name| {
            let scheme = registry
                .resolve(name)
                .with_context(|| format!("Cannot resolve channel {name:?}"))?;
            Ok((name.clone(), scheme))
        })
        .collect::<Result<Vec<_>>>()?;

    print_scheme_table(&rows);
    Ok(())
}
