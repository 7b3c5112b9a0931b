//! Filter command implementation.

use crate::cli::FilterArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use hearth_domain::{Inventory, SynergyRecord};
use hearth_gatekeeper::Gatekeeper;
use hearth_pipeline::EngineConfig;
use hearth_providers::read_json;
use tracing::info;

/// Execute the filter command.
///
/// Re-runs validation, scoring and deduplication over a stored batch. Without
/// an inventory the device-existence checks are skipped.
pub async fn execute_filter(args: FilterArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let filter_config = match args.preset {
        Some(preset) => EngineConfig::from(preset).filter,
        None => config.engine.filter.clone(),
    };
    let gatekeeper = Gatekeeper::new(filter_config).map_err(hearth_pipeline::EngineError::from)?;

    let records: Vec<SynergyRecord> = read_json(&args.candidates)?;
    let inventory: Option<Inventory> = match &args.inventory {
        Some(path) => Some(read_json(path)?),
        None => None,
    };

    info!("Filtering {} stored synergies", records.len());
    let outcome = gatekeeper.filter_records(records, inventory.as_ref());

    println!("{}", formatter.format_filter_outcome(&outcome, args.show_rejected)?);

    Ok(())
}
