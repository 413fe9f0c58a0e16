use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use postedit_sim::config::{load_config_from_file, SessionConfig};
use postedit_sim::corpus::{run_simulation, CorpusArgs};
use postedit_sim::error::SimResult;
use postedit_sim::logging;
use postedit_sim::metrics::display_ratio;

/// Simulates a user interactively post-editing machine translation output,
/// measuring the word-stroke and mouse-action effort the corrections cost.
#[derive(Debug, Parser)]
#[command(name = "postedit-sim", version, about)]
struct Cli {
    /// Source sentences, one per line.
    #[arg(short, long)]
    source: PathBuf,

    /// Reference translations, aligned line by line with the sources.
    #[arg(short, long)]
    references: PathBuf,

    /// Baseline machine translations feeding the generator.
    #[arg(long)]
    hypotheses: PathBuf,

    /// Write corrected hypotheses here, one per line.
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// Write the uncorrected hypotheses here for later comparison.
    #[arg(long)]
    original_dest: Option<PathBuf>,

    /// Write final totals and ratios here as JSON.
    #[arg(short, long)]
    eval_output: Option<PathBuf>,

    /// TOML configuration file; CLI flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of newly generated tokens between isles per cycle.
    #[arg(long)]
    max_n: Option<usize>,

    /// Beam width, forwarded to the generator untouched.
    #[arg(long)]
    beam: Option<usize>,

    /// Length-normalization alpha, forwarded to the generator untouched.
    #[arg(long)]
    alpha: Option<f32>,

    /// Prefix-only correction instead of isle-based correction.
    #[arg(short, long)]
    prefix: bool,

    /// Enable debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> SimResult<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(max_n) = cli.max_n {
        config.max_extra_tokens = max_n;
    }
    if cli.prefix {
        config.prefix_mode = true;
    }
    if let Some(beam) = cli.beam {
        config.decoding.beam_size = beam;
    }
    if let Some(alpha) = cli.alpha {
        config.decoding.alpha_factor = alpha;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let interrupt_flag = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupt_flag);
        if let Err(e) = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        }) {
            tracing::warn!("failed to install interrupt handler: {e}");
        }
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let args = CorpusArgs {
        source_path: cli.source,
        reference_path: cli.references,
        hypotheses_path: cli.hypotheses,
        dest_path: cli.dest,
        original_dest_path: cli.original_dest,
        eval_output_path: cli.eval_output,
    };

    let flag = Arc::clone(&interrupt_flag);
    match run_simulation(&config, &args, &|| flag.load(Ordering::SeqCst)) {
        Ok(summary) => {
            println!("sentences:       {}", summary.totals.sentences);
            println!("word strokes:    {}", summary.totals.errors);
            println!("mouse actions:   {}", summary.totals.mouse_actions);
            println!("WSR:             {}", display_ratio(summary.totals.wsr()));
            println!("MAR:             {}", display_ratio(summary.totals.mar()));
            println!("MAR_c:           {}", display_ratio(summary.totals.mar_c()));
            if summary.interrupted {
                // Conventional exit status for a SIGINT-terminated run.
                ExitCode::from(130)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
