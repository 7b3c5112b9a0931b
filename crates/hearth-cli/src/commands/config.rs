//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::Config;
use crate::error::Result;
use hearth_pipeline::EngineConfig;

/// Execute the config command.
pub async fn execute_config(args: ConfigArgs, config: &Config) -> Result<()> {
    let mut effective = config.clone();
    if let Some(preset) = args.preset {
        effective.engine = EngineConfig::from(preset);
    }

    print!("{}", effective.to_toml()?);
    Ok(())
}
