use std::path::PathBuf;

use antennae::{simulate, Result, ScenarioConfig};
use clap::Parser;
use log::info;

/// Simulate two colliding ring galaxies and write their trajectories as CSV.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML scenario; the Antennae encounter is used if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the output path of the scenario.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Append to the output file instead of truncating it.
    #[arg(short, long)]
    append: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => {
            info!("loading scenario from {}", path.display());
            ScenarioConfig::from_path(path)?
        }
        None => ScenarioConfig::default(),
    };
    if let Some(output) = args.output {
        cfg.output.path = output;
    }
    cfg.output.append |= args.append;

    simulate(&cfg)?;
    Ok(())
}
