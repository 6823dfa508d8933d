//! Match two recorded venue snapshots and print the report.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use venue_match_core::logging::init_logging;
use venue_match_core::{fetch_and_match, MarketMatcher, MatcherConfig, SnapshotProvider, Venue};

/// Pair markets from two venue snapshots and print the match report as JSON.
#[derive(Parser, Debug)]
#[command(name = "match_snapshots")]
#[command(version, about, long_about = None)]
struct Args {
    /// Primary venue snapshot (JSON array of markets)
    primary: PathBuf,

    /// Secondary venue snapshot (JSON array of markets)
    secondary: PathBuf,

    /// Venue to tag untagged primary markets with
    #[arg(long, value_enum, default_value_t = VenueArg::Kalshi)]
    primary_venue: VenueArg,

    /// Venue to tag untagged secondary markets with
    #[arg(long, value_enum, default_value_t = VenueArg::Polymarket)]
    secondary_venue: VenueArg,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum VenueArg {
    Kalshi,
    Polymarket,
    Other,
}

impl From<VenueArg> for Venue {
    fn from(arg: VenueArg) -> Self {
        match arg {
            VenueArg::Kalshi => Venue::Kalshi,
            VenueArg::Polymarket => Venue::Polymarket,
            VenueArg::Other => Venue::Other,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = MatcherConfig::from_env()?;
    init_logging();

    info!("Starting snapshot match...");

    let matcher = MarketMatcher::from_config(&config)?;
    let primary = SnapshotProvider::from_file(args.primary_venue.into(), &args.primary).await?;
    let secondary = SnapshotProvider::from_file(args.secondary_venue.into(), &args.secondary).await?;

    let report = fetch_and_match(&matcher, &primary, &secondary).await?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize match report")?;
    println!("{}", json);

    Ok(())
}
