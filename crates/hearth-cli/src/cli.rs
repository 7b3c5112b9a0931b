//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hearth CLI - Discover and score smart-home automation opportunities.
#[derive(Debug, Parser)]
#[command(name = "hearth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.hearth/config.toml)
    #[arg(short, long, global = true, env = "HEARTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full analysis against a snapshot directory
    Analyze(AnalyzeArgs),

    /// Re-filter a stored batch of synergies
    Filter(FilterArgs),

    /// Print the relationship catalog
    Catalog,

    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Directory holding inventory.json and optional statistics.json, signals.json, blueprints.json
    pub snapshot: PathBuf,

    /// Query a blueprint index over HTTP instead of blueprints.json
    #[arg(long, env = "HEARTH_CORPUS_URL")]
    pub corpus_url: Option<String>,

    /// Configuration preset, overriding the config file
    #[arg(short, long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Run deadline in milliseconds, overriding the configuration
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Print rejected synergies as well
    #[arg(long)]
    pub show_rejected: bool,
}

/// Arguments for the filter command.
#[derive(Debug, Parser)]
pub struct FilterArgs {
    /// JSON array of synergy records
    pub candidates: PathBuf,

    /// Inventory JSON used to confirm devices exist and are active
    #[arg(short, long)]
    pub inventory: Option<PathBuf>,

    /// Configuration preset, overriding the config file
    #[arg(short, long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Print rejected synergies as well
    #[arg(long)]
    pub show_rejected: bool,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Print a preset instead of the loaded configuration
    #[arg(short, long, value_enum)]
    pub preset: Option<PresetArg>,
}

/// Configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PresetArg {
    /// Built-in defaults
    Default,
    /// Fewer, safer suggestions
    Strict,
    /// More suggestions, including discovered relationships
    Permissive,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<PresetArg> for hearth_pipeline::EngineConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Default => hearth_pipeline::EngineConfig::default(),
            PresetArg::Strict => hearth_pipeline::EngineConfig::strict(),
            PresetArg::Permissive => hearth_pipeline::EngineConfig::permissive(),
        }
    }
}
