//! poimap - a terminal front end for viewport-driven POI fetching.
//!
//! Stands in for the map rendering layer: viewport events come from stdin,
//! visible markers are printed whenever the displayed POI list changes.

mod viewport;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use poimap_core::{ApiClient, BoundingBox, Config, MapSession, Poi, RequestStatus};

use viewport::{parse_line, InputLine};

// ============================================================================
// Constants
// ============================================================================

/// Interval for checking whether the displayed POI list changed (in milliseconds)
const REFRESH_POLL_INTERVAL_MS: u64 = 100;

#[derive(Parser, Debug)]
#[command(name = "poimap", version, about = "Fetch and display map POIs for a viewport")]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch POIs for one bounding box and print them
    Fetch {
        #[arg(allow_negative_numbers = true)]
        sw_lat: f64,
        #[arg(allow_negative_numbers = true)]
        sw_lng: f64,
        #[arg(allow_negative_numbers = true)]
        ne_lat: f64,
        #[arg(allow_negative_numbers = true)]
        ne_lng: f64,
    },
    /// Read viewport events (`sw_lat sw_lng ne_lat ne_lng zoom`) from stdin
    Watch,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_ref())?;
    info!("poimap starting");

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default().with_env_overrides()
    });

    // The map cannot render without a provider key
    config.require_maps_api_key()?;

    let session = MapSession::from_config(&config)?;

    let result = match cli.command {
        Command::Fetch {
            sw_lat,
            sw_lng,
            ne_lat,
            ne_lng,
        } => {
            let bounds = BoundingBox::from_coords(sw_lat, sw_lng, ne_lat, ne_lng);
            run_fetch(&session, bounds).await
        }
        Command::Watch => run_watch(session).await,
    };

    info!("poimap shutting down");
    result
}

async fn run_fetch(session: &MapSession<ApiClient>, bounds: BoundingBox) -> Result<()> {
    let report = session.coordinator().fetch_pois(&bounds.clamped()).await?;
    eprintln!(
        "{} POIs ({:?}, {:?})",
        report.pois.len(),
        report.origin,
        report.outcome
    );
    print_markers(&report.pois);
    Ok(())
}

async fn run_watch(mut session: MapSession<ApiClient>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(REFRESH_POLL_INTERVAL_MS));
    let mut last_seen = (0, RequestStatus::Idle);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match parse_line(&line) {
                    Ok(InputLine::Viewport { bounds, zoom }) => {
                        if !session.trigger_viewport_change(bounds, zoom) {
                            eprintln!("zoom {} ignored (last fetch at zoom {:?})", zoom, session.last_zoom());
                        }
                    }
                    Ok(InputLine::ClearCache) => {
                        session.clear_cache().await;
                        eprintln!("cache cleared");
                    }
                    Ok(InputLine::Blank) => {}
                    Err(e) => eprintln!("{}", e),
                }
            }
            _ = ticker.tick() => {
                report_changes(&session, &mut last_seen).await;
            }
        }
    }

    // Input closed: let the pending debounce and request settle before exiting
    session.settle().await;
    report_changes(&session, &mut last_seen).await;

    Ok(())
}

/// Print the visible markers if the revision or status moved since `last_seen`.
async fn report_changes(
    session: &MapSession<ApiClient>,
    last_seen: &mut (u64, RequestStatus),
) {
    let snapshot = session.snapshot().await;
    if (snapshot.revision, snapshot.status) == *last_seen {
        return;
    }
    *last_seen = (snapshot.revision, snapshot.status);

    match snapshot.status {
        RequestStatus::Failed => eprintln!(
            "fetch failed: {}",
            snapshot.error.as_deref().unwrap_or("unknown error")
        ),
        RequestStatus::Succeeded => {
            let visible = session.visible_pois().await;
            eprintln!("{} of {} POIs visible", visible.len(), snapshot.pois.len());
            print_markers(&visible);
        }
        status => eprintln!("status: {}", status),
    }
}

fn print_markers(pois: &[Poi]) {
    for poi in pois {
        let partner = poi
            .partner_display()
            .map(|p| format!(" [{}]", p))
            .unwrap_or_default();
        println!(
            "{} {} ({}) {}{}",
            poi.poi_type.marker_icon(),
            poi.name,
            poi.poi_type,
            poi.position_display(),
            partner
        );
    }
}
