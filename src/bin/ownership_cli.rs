//! Ownership CLI
//!
//! Ad-hoc ownership queries against a directory of exported tables.
//!
//! # Usage
//!
//! ```bash
//! # Direct subsidiaries at the display threshold
//! ownership_cli --data-dir ./data subsidiaries ALP
//!
//! # Parents of company id 42, with debug logging
//! RUST_LOG=ownership_graph=debug ownership_cli --data-dir ./data parents 42
//!
//! # Related parties including user-entered relatives
//! ownership_cli --data-dir ./data --relatives relatives.json related ALP
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use ownership_graph::{load_dir, EngineConfig, OwnershipQueryEngine, RelativeStore};

#[derive(Parser)]
#[command(name = "ownership_cli")]
#[command(version = "0.1.0")]
#[command(about = "Resolve ownership chains and related parties from exported company tables")]
struct Cli {
    /// Directory holding Company.json and the optional ShareHolders.json,
    /// CompanyMembers.json, lsdkkd.json and DDKD.json
    #[arg(long, env = "OWNERSHIP_DATA_DIR")]
    data_dir: PathBuf,

    /// Engine configuration (YAML); defaults to OWNERSHIP_CONFIG or config/engine.yaml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Relatives snapshot (JSON) used by `related`
    #[arg(long)]
    relatives: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Direct subsidiaries at or above the display threshold
    Subsidiaries { company: String },
    /// Every ownership branch below the company
    Branches { company: String },
    /// Summed equity interests at or above the display threshold
    Equity { company: String },
    /// Parent companies at or above the parent floor
    Parents { company: String },
    /// Members of the company's group
    Group { company: String },
    /// Full shareholder register
    Register { company: String },
    /// Related-party roster
    Related { company: String },
    /// Business registration history
    History { company: String },
    /// Branches and business locations
    Locations { company: String },
}

impl Commands {
    fn company(&self) -> &str {
        match self {
            Commands::Subsidiaries { company }
            | Commands::Branches { company }
            | Commands::Equity { company }
            | Commands::Parents { company }
            | Commands::Group { company }
            | Commands::Register { company }
            | Commands::Related { company }
            | Commands::History { company }
            | Commands::Locations { company } => company,
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::from_env().context("resolving engine configuration")?,
    };

    let (store, report) = load_dir(&cli.data_dir)
        .with_context(|| format!("loading tables from {}", cli.data_dir.display()))?;
    tracing::info!("Load report: {:?}", report);

    let key = cli.command.company();
    let root = store
        .find(key)
        .map(|c| c.id)
        .ok_or_else(|| anyhow!("no company with id or code {:?}", key))?;

    let engine = OwnershipQueryEngine::new(Arc::new(store), config);
    let display = engine.config().display_threshold_pct;

    let json = match &cli.command {
        Commands::Subsidiaries { .. } => {
            serde_json::to_string_pretty(&engine.direct_subsidiaries(root, display)?)?
        }
        Commands::Branches { .. } => serde_json::to_string_pretty(&engine.ownership_branches(root)?)?,
        Commands::Equity { .. } => {
            serde_json::to_string_pretty(&engine.equity_interests(root, display)?)?
        }
        Commands::Parents { .. } => {
            let floor = engine.config().parent_floor_pct;
            serde_json::to_string_pretty(&engine.parent_companies(root, floor)?)?
        }
        Commands::Group { .. } => {
            let members: Vec<_> = engine
                .subsidiary_group(root)?
                .into_iter()
                .filter_map(|id| engine.store().company(id))
                .collect();
            serde_json::to_string_pretty(&members)?
        }
        Commands::Register { .. } => {
            serde_json::to_string_pretty(&engine.shareholder_register(root))?
        }
        Commands::Related { .. } => {
            let relatives = match &cli.relatives {
                Some(path) => RelativeStore::load(path)
                    .with_context(|| format!("loading relatives {}", path.display()))?,
                None => RelativeStore::new(),
            };
            serde_json::to_string_pretty(&engine.related_parties(root, &relatives)?)?
        }
        Commands::History { .. } => {
            serde_json::to_string_pretty(&engine.registration_history(root))?
        }
        Commands::Locations { .. } => {
            serde_json::to_string_pretty(&engine.business_locations(root))?
        }
    };
    Ok(json)
}
