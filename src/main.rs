use anyhow::Result;
use clap::Parser;
use rainjoin::PipelineConfig;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Join monthly dengue case counts with rainfall per state"
)]
struct Args {
    /// YAML or JSON config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Case series file or glob
    #[arg(long)]
    cases: Option<String>,
    /// Rainfall series file or glob
    #[arg(long)]
    rainfall: Option<String>,
    /// Output path prefix (".csv" is appended)
    #[arg(short, long)]
    output: Option<String>,
    /// Worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rainjoin=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    // ─── 2) config ───────────────────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(cases) = args.cases {
        config.cases.path = cases;
    }
    if let Some(rainfall) = args.rainfall {
        config.rainfall.path = rainfall;
    }
    if let Some(output) = args.output {
        config.output.prefix = output;
    }

    if let Some(n) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            warn!("could not size thread pool: {}", e);
        }
    }

    // ─── 3) run ──────────────────────────────────────────────────────
    info!(cases = %config.cases.path, rainfall = %config.rainfall.path, "startup");
    let summary = rainjoin::run(&config)?;
    info!(
        output = %summary.output,
        rows = summary.rows_written,
        rejected = summary.cases.rejected + summary.rainfall.rejected,
        "all done"
    );
    Ok(())
}
