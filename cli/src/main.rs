//! sift-history - inspect the persisted analysis history
//!
//! Lists recorded analysis runs and shows the diagnostics of a single run.

use clap::Parser;
use clap::Subcommand;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use sift_persistence::AnalysisHistory;
use sift_persistence::EntityStore;
use sift_persistence::RunSummary;
use sift_persistence::StoreConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::FmtSubscriber;

/// Inspect the analysis runs recorded by a sift store
#[derive(Parser, Debug)]
#[command(name = "sift-history")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Store configuration file (TOML)
    #[arg(long, env = "SIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Store snapshot to read, overriding the configured path
    #[arg(long, env = "SIFT_STORE")]
    store: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List recorded runs, newest first
    Runs {
        /// Show at most this many runs
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Only show failed runs
        #[arg(long)]
        failed: bool,
    },
    /// Show the diagnostics of one run (entity id like `#3`, or store id);
    /// defaults to the latest run
    Show { run: Option<String> },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG takes precedence over -v
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(store) = cli.store {
        config = config.with_path(store);
    }
    debug!(?config, "resolved store configuration");

    let store = Arc::new(EntityStore::open(&config)?);
    let history = AnalysisHistory::new(store, config.max_runs);

    match cli.command {
        Command::Runs { limit, failed } => {
            let runs = history
                .runs()?
                .into_iter()
                .filter(|run| !failed || !run.success)
                .take(limit);
            let mut shown = 0;
            for run in runs {
                println!("{}", format_run(&run));
                shown += 1;
            }
            if shown == 0 {
                println!("no recorded runs");
            }
        }
        Command::Show { run } => {
            let summary = match run {
                Some(key) => history
                    .find(&key)?
                    .ok_or_else(|| eyre!("no run matches `{key}`"))?,
                None => history
                    .latest()?
                    .ok_or_else(|| eyre!("no recorded runs"))?,
            };
            println!("{}", format_run(&summary));
            let diagnostics = history.diagnostics(summary.entity)?;
            if diagnostics.is_empty() {
                println!("  not compiled.");
            }
            for diagnostic in diagnostics {
                println!("  {diagnostic}");
            }
        }
    }

    Ok(())
}

fn format_run(run: &RunSummary) -> String {
    format!(
        "{:>6}  {}  {:<7}  {:>3} problem(s)  {}",
        run.entity.to_string(),
        run.created_at.format("%Y-%m-%d %H:%M:%S"),
        if run.success { "ok" } else { "failed" },
        run.problems,
        run.store_id,
    )
}
