//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use hearth_domain::traits::BlueprintCorpus;
use hearth_pipeline::{EngineConfig, SynergyEngine, SynergyReport};
use hearth_providers::{HttpBlueprintCorpus, JsonSnapshot};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, info};

/// Execute the analyze command.
///
/// In JSON mode a failed run still prints its tagged outcome before the
/// error is returned.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let show_rejected = args.show_rejected;
    let report = match analyze(args, config).await {
        Ok(report) => report,
        Err(e) => {
            if let Some(outcome) = formatter.format_failure(&e)? {
                println!("{}", outcome);
            }
            return Err(e);
        }
    };

    println!("{}", formatter.format_report(&report, show_rejected)?);

    Ok(())
}

async fn analyze(args: AnalyzeArgs, config: &Config) -> Result<SynergyReport> {
    if !args.snapshot.is_dir() {
        return Err(CliError::Config(format!(
            "Snapshot directory not found: {}",
            args.snapshot.display()
        )));
    }

    let engine_config = args.preset.map(EngineConfig::from).unwrap_or_else(|| config.engine.clone());
    let deadline = args
        .deadline_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| engine_config.timeouts.run_deadline());
    let snapshot = JsonSnapshot::new(&args.snapshot);

    info!("Analyzing snapshot {}", args.snapshot.display());

    match &args.corpus_url {
        Some(url) => {
            debug!("Using blueprint index at {}", url);
            let corpus = HttpBlueprintCorpus::new(url.as_str())?;
            run_engine(snapshot, corpus, engine_config, deadline).await
        }
        None => run_engine(snapshot.clone(), snapshot, engine_config, deadline).await,
    }
}

/// Run one analysis, abandoning it on Ctrl-C.
async fn run_engine<B>(
    snapshot: JsonSnapshot,
    corpus: B,
    config: EngineConfig,
    deadline: Duration,
) -> Result<SynergyReport>
where
    B: BlueprintCorpus + Send + Sync + 'static,
    B::Error: Display,
{
    let engine = SynergyEngine::new(snapshot.clone(), snapshot.clone(), snapshot, corpus, config)?;

    tokio::select! {
        result = engine.run_with_deadline(deadline) => Ok(result?),
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    }
}
