//! Score SMILES strings from the command line.
//!
//! Results go to stdout as `<score> <--- <canonical smiles>`; logs go to
//! stderr.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use scscore_model::{Scorer, ScorerConfig};

const DEMO_SMILES: &[&str] = &["CCCOCCC", "CCCNc1ccccc1"];

#[derive(Parser, Debug)]
#[command(name = "scscore")]
#[command(about = "Synthetic complexity score for molecules given as SMILES")]
struct Args {
    /// SMILES to score. Without any (and without --input) a demo set is scored.
    smiles: Vec<String>,

    /// Compressed JSON weight file.
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Upper end of the score range.
    #[arg(long)]
    scale: Option<f64>,

    /// Fingerprint length; must match the weight file.
    #[arg(long)]
    fp_length: Option<usize>,

    /// Morgan fingerprint radius.
    #[arg(long)]
    fp_radius: Option<usize>,

    /// JSON file with scorer settings; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// File with one SMILES per line.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn scorer_config(&self) -> Result<ScorerConfig> {
        let mut config = match &self.config {
            Some(path) => ScorerConfig::from_json_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => ScorerConfig::default(),
        };
        if let Some(scale) = self.scale {
            config.score_scale = scale;
        }
        if let Some(len) = self.fp_length {
            config.fingerprint_length = len;
        }
        if let Some(radius) = self.fp_radius {
            config.fingerprint_radius = radius;
        }
        if let Some(weights) = &self.weights {
            config.weights = Some(weights.clone());
        }
        Ok(config)
    }

    fn inputs(&self) -> Result<Vec<String>> {
        let mut inputs = self.smiles.clone();
        if let Some(path) = &self.input {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading input {}", path.display()))?;
            inputs.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(String::from),
            );
        }
        if inputs.is_empty() {
            inputs = DEMO_SMILES.iter().map(|s| s.to_string()).collect();
        }
        Ok(inputs)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.scorer_config()?;
    let weight_path = config.weight_path();
    debug!(?config, "configuration");

    let mut scorer = Scorer::new(config).context("invalid scorer configuration")?;
    scorer
        .restore(Some(&weight_path))
        .with_context(|| format!("loading weights from {}", weight_path.display()))?;

    for smiles in args.inputs()? {
        let result = scorer.score(&smiles)?;
        println!("{result}");
    }
    Ok(())
}
