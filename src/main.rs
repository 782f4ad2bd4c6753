mod config;
mod data;
mod error;
mod filter;
mod model;
mod normalize;
mod rank;
mod report;
mod segment;

use std::env;

use anyhow::{bail, Context};
use tracing::info;

use config::AnalysisConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let laps_path = match args.get(1) {
        Some(path) => path.clone(),
        None => bail!("usage: tirepace <laps.csv> [config.json] [adjusted-out.csv]"),
    };

    let config = match args.get(2) {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => AnalysisConfig::default(),
    };

    let (laps, summary) = data::load_laps(&laps_path, &config)
        .with_context(|| format!("loading laps from {laps_path}"))?;
    info!(
        rows = summary.rows_read,
        skipped = summary.rows_skipped,
        ignored = summary.rows_ignored,
        laps = laps.len(),
        "telemetry loaded"
    );
    if laps.is_empty() {
        bail!("no usable laps in {laps_path}");
    }

    let overview = data::session_overview(&laps);

    let representative = filter::pace_laps(&laps, &config);
    info!(
        kept = representative.len(),
        dropped = laps.len() - representative.len(),
        "pace filter applied"
    );

    let adjusted = normalize::adjust_laps(&representative, &config)?;
    let trends = model::fit_trends(&adjusted);

    let unsegmented = adjusted
        .iter()
        .filter(|lap| segment::segment_of(&config, lap.lap_number).is_none())
        .count();
    if unsegmented > 0 {
        info!(laps = unsegmented, "laps outside every segment range");
    }

    let rankings: Vec<_> = config
        .segments
        .iter()
        .map(|segment| rank::rank_segment(&adjusted, segment, &config))
        .collect();
    let evolution = rank::driver_evolution(&rankings);

    report::print_report(&overview, &trends, &rankings, &evolution);

    if let Some(out_path) = args.get(3) {
        report::export_adjusted(out_path, &adjusted)
            .with_context(|| format!("writing adjusted laps to {out_path}"))?;
        info!(laps = adjusted.len(), path = %out_path, "adjusted laps exported");
    }

    Ok(())
}
