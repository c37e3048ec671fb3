use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use linkrank::pipeline::spec::RankSpec;
use linkrank::{Parallelism, RankPipeline, RecordStore, StageTimingObserver};

#[derive(Parser, Debug)]
#[command(
    name = "linkrank",
    version,
    about = "Score crawled pages by link importance (PageRank)"
)]
struct Cli {
    /// JSON array of crawled records (url, links, ...)
    input: PathBuf,

    /// Where to write the records with their "pr" score
    output: PathBuf,

    /// Run spec JSON; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Damping factor, strictly between 0 and 1
    #[arg(short, long)]
    damping: Option<f64>,

    /// Absolute L1 convergence threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Iteration cap, at least 1
    #[arg(short, long, allow_negative_numbers = true)]
    max_iterations: Option<i64>,

    /// Starting rank of every page
    #[arg(long)]
    initial_value: Option<f64>,

    /// Force sequential accumulation
    #[arg(long)]
    sequential: bool,

    /// Drop repeated URLs (first occurrence wins) before ranking
    #[arg(long)]
    dedup: bool,

    /// With --dedup, write the dropped records here for auditing
    #[arg(long, value_name = "PATH", requires = "dedup")]
    removed: Option<PathBuf>,

    /// Print the N highest-ranked pages
    #[arg(long, default_value_t = 10)]
    top: usize,
}

impl Cli {
    fn spec(&self) -> Result<RankSpec> {
        let mut spec = match &self.config {
            Some(path) => RankSpec::load(path)
                .with_context(|| format!("failed to read run spec {}", path.display()))?,
            None => RankSpec::default(),
        };

        if let Some(d) = self.damping {
            spec.rank.damping_factor = d;
        }
        if let Some(t) = self.threshold {
            spec.rank.convergence_threshold = t;
        }
        if let Some(m) = self.max_iterations {
            spec.rank.max_iterations = m;
        }
        if let Some(v) = self.initial_value {
            spec.rank.initial_value = v;
        }
        if self.sequential {
            spec.rank.parallelism = Parallelism::Sequential;
        }

        Ok(spec)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let pipeline = RankPipeline::from_spec(&cli.spec()?).context("invalid ranking configuration")?;

    let mut store = RecordStore::load_json(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    if cli.dedup {
        let removed = store.dedup_by_url();
        if let Some(path) = &cli.removed {
            RecordStore::new(removed)
                .save_json(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "removed duplicates written");
        }
    }

    let mut observer = StageTimingObserver::new();
    let outcome = pipeline.run(&store, &mut observer)?;

    for (stage, report) in &observer.stages {
        tracing::info!(stage, elapsed_ms = report.duration.as_secs_f64() * 1e3, "stage done");
    }
    if !outcome.result.converged {
        tracing::warn!(
            iterations = outcome.result.iterations,
            delta = outcome.result.delta,
            "scores are approximate; consider raising --max-iterations"
        );
    }
    if outcome.result.non_finite > 0 {
        tracing::error!(
            count = outcome.result.non_finite,
            "non-finite rank values were produced"
        );
    }

    outcome
        .store
        .save_json(&cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    for (position, record) in outcome.store.ranked().into_iter().take(cli.top).enumerate() {
        println!(
            "{:>3}. {:.6}  {}  {}",
            position + 1,
            record.score.unwrap_or_default(),
            record.url,
            record.title.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
