mod app;
mod logging;
mod output;

use anyhow::{Context, Result};
use app::{App, AppOptions};
use clap::Parser;
use iat_experiment::{BlockConfig, DEFAULT_DELIMITER, LogPresenter, run_debug};
use iat_render::Scene;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::info;

/// Runs one Implicit Association Test block.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Block configuration (JSON).
    config: PathBuf,

    /// TrueType font used to draw stimuli and labels.
    #[arg(long, default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf")]
    font: PathBuf,

    /// Where to write the results; stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Separator used to join each result column.
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    delimiter: String,

    /// Run the block headless with synthetic responses.
    #[arg(long)]
    debug: bool,

    /// Seed for trial shuffling and synthetic responses.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing("info")?;

    let config = BlockConfig::from_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let block = match args.seed {
        Some(seed) => config.build(&mut StdRng::seed_from_u64(seed)),
        None => config.build(&mut rand::rng()),
    }
    .context("invalid block configuration")?;
    info!(
        label = %config.label,
        trials = block.trials.len(),
        practice = config.is_practice,
        "block loaded"
    );

    if let Some(mut debug) = config.synthetic_run(args.debug) {
        if args.seed.is_some() {
            debug.seed = args.seed;
        }
        let results = run_debug(block, &debug, LogPresenter)?;
        return output::write_results(&results.join(&args.delimiter), args.output.as_deref());
    }

    let scene = Scene {
        left_label: config.left_label.clone(),
        right_label: config.right_label.clone(),
        notice: config.notice.clone(),
        start_hint: format!("Press {} to start", block.start_code),
        ..Scene::default()
    };
    let options = AppOptions {
        font_path: args.font,
        output: args.output,
        delimiter: args.delimiter,
        title: if config.label.is_empty() {
            "IAT".to_owned()
        } else {
            config.label.clone()
        },
    };
    App::new(block, scene, options)?.run()
}
