use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use showtimes_scraper::app::ports::{PageFetcher, SnapshotStore};
use showtimes_scraper::app::{HarvestUseCase, RunOutcome};
use showtimes_scraper::config::Config;
use showtimes_scraper::constants::DEFAULT_OUTPUT_DIR;
use showtimes_scraper::infra::ReqwestFetcher;
use showtimes_scraper::pipeline::export::write_json;
use showtimes_scraper::pipeline::storage::SqliteSnapshotStore;
use showtimes_scraper::pipeline::Harvester;
use showtimes_scraper::server::{start_server, AppState};
use showtimes_scraper::{logging, metrics};

#[derive(Parser)]
#[command(name = "showtimes_scraper")]
#[command(about = "Daily cinema showtimes harvester and snapshot query API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest today's snapshot unless it is already stored (scheduler entry point)
    Run {
        /// Harvest and overwrite even if today's snapshot exists
        #[arg(long)]
        force: bool,
    },
    /// Harvest without touching the store and write the snapshot as JSON
    Scrape {
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
    /// Serve the read-only query API over stored snapshots
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn build_fetcher(config: &Config) -> anyhow::Result<Arc<dyn PageFetcher>> {
    let fetcher = ReqwestFetcher::new(&config.source.user_agent, config.source.connect_timeout())
        .context("building HTTP client")?;
    Ok(Arc::new(fetcher))
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn SnapshotStore>> {
    let store = SqliteSnapshotStore::open(&config.store.path)
        .with_context(|| format!("opening snapshot store at {}", config.store.path.display()))?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;

    let _log_guard = logging::init_logging(&config.logging.dir);
    if let Some(port) = config.metrics.port {
        metrics::init_metrics(port);
    }

    let today = Local::now().date_naive();

    match cli.command {
        Commands::Run { force } => {
            let harvester = Harvester::from_config(build_fetcher(&config)?, &config);
            let use_case = HarvestUseCase::new(harvester, open_store(&config)?);
            let result = if force {
                use_case.run_forced(today).await
            } else {
                use_case.run_once(today).await
            };
            match result {
                Ok(summary) => {
                    info!(
                        key = %summary.key,
                        outcome = ?summary.outcome,
                        "Run finished: {} venue(s), {} item entries in {:.1}s",
                        summary.venues,
                        summary.items,
                        summary.duration_secs
                    );
                    if summary.outcome == RunOutcome::LostRace {
                        info!("Another run stored {} first", summary.key);
                    }
                }
                Err(e) => {
                    error!("Run failed: {}", e);
                    return Err(e).context("daily harvest failed; retry on the next scheduled run");
                }
            }
        }
        Commands::Scrape { output_dir } => {
            let harvester = Harvester::from_config(build_fetcher(&config)?, &config);
            let snapshot = harvester.harvest(today).await.context("harvest failed")?;
            let path = write_json(&snapshot, &output_dir).context("writing snapshot JSON")?;
            info!("Data saved to {}", path.display());
        }
        Commands::Serve { port } => {
            let state = AppState::new(open_store(&config)?);
            start_server(state, port.unwrap_or(config.server.port)).await?;
        }
    }
    Ok(())
}
