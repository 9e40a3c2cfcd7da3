//! ocrbench - OCR benchmark dashboard on the command line
//!
//! Loads the benchmark manifest and result files from the data URL and
//! prints the leaderboard, the per-subcategory tables or the per-image
//! detail view of one subcategory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ocrbench_common::config::{ConfigOverrides, DashboardSettings};
use ocrbench_dash::aggregate::{Metric, SortDirection, SortState};
use ocrbench_dash::detail::ImageSort;
use ocrbench_dash::render;
use ocrbench_dash::{Dashboard, HttpFetcher, Screen, View};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ocrbench")]
#[command(about = "OCR benchmark results dashboard", long_about = None)]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "OCRBENCH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Base URL of the JSON data directory (overrides env and config)
    #[arg(long, global = true)]
    data_url: Option<String>,

    /// Per-request timeout in milliseconds (overrides env and config)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overall leaderboard followed by every subcategory table
    Leaderboard {
        /// Sort column: accuracy, cer, wer or time
        #[arg(long, default_value = "accuracy")]
        sort: Metric,

        /// Sort direction (defaults to the column's natural direction)
        #[arg(long)]
        direction: Option<SortDirection>,

        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Per-image results of one subcategory
    Details {
        category: String,
        subcategory: String,

        /// filename-asc, filename-desc, accuracy-desc or accuracy-asc
        #[arg(long, default_value = "filename-asc")]
        sort: ImageSort,

        /// Show only this model
        #[arg(long)]
        model: Option<String>,

        /// Include a word diff against the ground truth
        #[arg(long)]
        diff: bool,

        #[arg(long)]
        json: bool,
    },

    /// Resolve a bookmarked query string (e.g. `view=details&category=X&subcategory=Y`)
    Open {
        query: String,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Installed before config loading so its warnings are visible; logs go
    // to stderr so stdout stays clean
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting ocrbench v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let overrides = ConfigOverrides {
        data_url: args.data_url.clone(),
        timeout_ms: args.timeout_ms,
    };
    let settings = DashboardSettings::load(args.config.as_deref(), &overrides)
        .context("Failed to resolve configuration")?;

    // RUST_LOG wins over the configured level
    if !from_env {
        match EnvFilter::try_new(&settings.log_level) {
            Ok(configured) => {
                if let Err(e) = filter_handle.reload(configured) {
                    warn!("Failed to apply log level {:?}: {}", settings.log_level, e);
                }
            }
            Err(e) => warn!("Invalid log level {:?}: {}", settings.log_level, e),
        }
    }

    info!(
        data_url = %settings.data_url,
        timeout_ms = settings.timeout.as_millis() as u64,
        "Configuration resolved"
    );

    let cancel_token = CancellationToken::new();
    spawn_interrupt_handler(cancel_token.clone());

    let fetcher = HttpFetcher::new(&settings.data_url)
        .context("Invalid data URL")?
        .with_cancellation(cancel_token);
    let mut dashboard = Dashboard::new(Arc::new(fetcher), &settings);

    if let Err(e) = dashboard.reload().await {
        error!("Failed to load benchmark data: {}", e);
        return Err(e.into());
    }

    match args.command {
        Command::Leaderboard {
            sort,
            direction,
            json,
        } => {
            let sort = SortState::new(sort, direction.unwrap_or(sort.default_direction()));
            print_dashboard(&dashboard, sort, json)?;
        }
        Command::Details {
            category,
            subcategory,
            sort,
            model,
            diff,
            json,
        } => {
            let screen = dashboard
                .open(View::details(category, subcategory))
                .await?;
            print_screen(&dashboard, screen, sort, model.as_deref(), diff, json)?;
        }
        Command::Open { query, json } => {
            let view = View::from_query(&query);
            info!(query = %view.to_query(), "Opening view");
            let screen = dashboard.open(view).await?;
            print_screen(&dashboard, screen, ImageSort::default(), None, false, json)?;
        }
    }

    Ok(())
}

fn spawn_interrupt_handler(cancel_token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, cancelling in-flight requests");
                cancel_token.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });
}

fn print_dashboard(dashboard: &Dashboard, sort: SortState, json: bool) -> Result<()> {
    let context = dashboard
        .context()
        .context("Benchmark data has not been loaded")?;

    if json {
        let value = render::dashboard_json(context, sort);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render::render_dashboard(context, sort));
    }
    Ok(())
}

fn print_screen(
    dashboard: &Dashboard,
    screen: Screen,
    sort: ImageSort,
    model: Option<&str>,
    diff: bool,
    json: bool,
) -> Result<()> {
    match screen {
        Screen::Dashboard => print_dashboard(dashboard, SortState::default(), json),
        Screen::Details(detail) => {
            if json {
                let value = render::details_json(&detail, sort, model, diff);
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let links = dashboard
                    .context()
                    .map(|c| c.model_links.clone())
                    .unwrap_or_default();
                print!("{}", render::render_details(&detail, sort, model, diff, &links));
            }
            Ok(())
        }
    }
}
