mod app;
mod export;
mod form;

use anyhow::{Context, Result};
use app::{App, AppOptions};
use clap::Parser;
use cueing_experiment::{ExperimentConfig, SessionStateMachine};
use cueing_layout::ZonePolicy;
use cueing_render::{FontVec, load_font};
use cueing_report::{DEFAULT_ENDPOINT, HttpReporter};
use cueing_timing::HighPrecisionTimer;
use form::SubmissionForm;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Fonts tried when `--font` is not given.
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Parser, Debug)]
#[command(name = "cueing")]
#[command(about = "Contextual-cueing visual search task")]
struct Cli {
    /// Participant name (letters only); can also be typed on the end screen
    #[arg(long)]
    participant: Option<String>,

    /// Wake-status condition, one of the configured options
    #[arg(long)]
    condition: Option<String>,

    /// Results endpoint
    #[arg(long, env = "CUEING_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// JSON experiment configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// TrueType font for instructions and counters
    #[arg(long, env = "CUEING_FONT")]
    font: Option<PathBuf>,

    /// Seed for a reproducible stimulus corpus
    #[arg(long)]
    seed: Option<u64>,

    /// Write the layout snapshot and CSV at startup; E re-exports the CSV
    #[arg(long)]
    debug: bool,

    /// Directory for debug exports
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => ExperimentConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExperimentConfig::default(),
    };

    let rng = match cli.seed {
        Some(seed) => {
            info!(seed, "seeded stimulus corpus");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let crosshair = matches!(config.geometry.policy, ZonePolicy::Band { .. });
    let mut form = SubmissionForm::new(config.conditions.clone());
    form.prefill(cli.participant.as_deref(), cli.condition.as_deref());

    let session = SessionStateMachine::new(config, HighPrecisionTimer::new(), rng)
        .context("building stimulus corpus")?;
    let reporter = HttpReporter::new(&cli.endpoint).context("creating HTTP client")?;

    let options = AppOptions {
        debug: cli.debug,
        export_dir: cli.export_dir,
        crosshair,
    };
    let font = resolve_font(cli.font.as_ref());

    let app = App::new(session, form, reporter, options, font)?;
    app.run()
}

fn resolve_font(requested: Option<&PathBuf>) -> Option<FontVec> {
    if let Some(path) = requested {
        match load_font(path) {
            Ok(font) => return Some(font),
            Err(e) => warn!("{e:#}"),
        }
    }
    FALLBACK_FONTS.iter().find_map(|p| load_font(p).ok())
}
