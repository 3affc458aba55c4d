use anyhow::{Context, Result};

use crate::cli::{CheckConfigArgs, Cli};
use crate::config::Config;

pub fn run(_cli: &Cli, args: &CheckConfigArgs) -> Result<()> {
    let config = Config::read(&args.config)?;
    config.validate()
        .with_context(|| format!("[check-config] {} is not a usable configuration", args.config.display()))?;

    println!("{}", config.to_json()?);
    Ok(())
}
