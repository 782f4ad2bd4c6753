use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::SessionOverview;
use crate::error::Result;
use crate::model::DegradationTrend;
use crate::normalize::AdjustedLap;
use crate::rank::{DriverEvolution, SegmentRanking};

pub fn print_report(
    overview: &SessionOverview,
    trends: &[DegradationTrend],
    rankings: &[SegmentRanking],
    evolution: &[DriverEvolution],
) {
    print_overview(overview);
    print_trends(trends);
    for ranking in rankings {
        print_ranking(ranking);
    }
    print_evolution(evolution, rankings);
}

fn print_overview(overview: &SessionOverview) {
    println!("\n=== Session Overview ===");
    println!("Laps loaded: {}", overview.total_laps);
    let total = overview.total_laps.max(1) as f64;
    for (compound, count) in &overview.compound_counts {
        println!(
            "- {:12} : {:4} laps ({:.1}%)",
            compound,
            count,
            100.0 * *count as f64 / total
        );
    }
    println!(
        "Weather: {} ({:.0}% of laps in rain)",
        weather_label(overview.wet_fraction),
        overview.wet_fraction * 100.0
    );
}

fn weather_label(wet_fraction: f64) -> &'static str {
    if wet_fraction <= 0.0 {
        "dry"
    } else if wet_fraction < 0.5 {
        "partly wet"
    } else {
        "predominantly wet"
    }
}

fn print_trends(trends: &[DegradationTrend]) {
    if trends.is_empty() {
        return;
    }
    println!("\n=== Observed Tire Degradation ===");
    for trend in trends {
        println!(
            "- {:12} : {:+.3}s per lap of age over {} laps (base {:.3}s)",
            trend.compound, trend.seconds_per_age_lap, trend.lap_count, trend.base_seconds
        );
    }
}

fn print_ranking(ranking: &SegmentRanking) {
    let segment = &ranking.segment;
    println!(
        "\n=== {} (laps {}-{}) ===",
        segment.name, segment.first_lap, segment.last_lap
    );
    if ranking.entries.is_empty() {
        println!("(no driver reached the minimum lap count)");
        return;
    }

    let leader_mean = ranking.entries[0].mean_seconds;
    println!(
        "{:>3}  {:6} {:>9} {:>8} {:>5} {:>8} {:>9}",
        "Pos", "Driver", "Mean", "Gap", "Laps", "StdDev", "Best"
    );
    for (index, entry) in ranking.entries.iter().enumerate() {
        println!(
            "{:>3}  {:6} {:>8.3}s {:>8} {:>5} {:>7.3}s {:>8.3}s",
            index + 1,
            entry.driver,
            entry.mean_seconds,
            format_gap(entry.mean_seconds - leader_mean),
            entry.lap_count,
            entry.std_dev_seconds,
            entry.best_seconds,
        );
    }
}

// Below 0.05s the gap is noise, so the leader and anyone effectively level
// with them show as the reference.
pub fn format_gap(gap_seconds: f64) -> String {
    if gap_seconds < 0.05 {
        "REF".to_string()
    } else {
        format!("+{gap_seconds:.2}s")
    }
}

fn print_evolution(evolution: &[DriverEvolution], rankings: &[SegmentRanking]) {
    if evolution.is_empty() {
        return;
    }
    println!("\n=== Driver Evolution ===");
    let mut header = format!("{:6}", "Driver");
    for ranking in rankings {
        header.push_str(&format!(" {:>18}", ranking.segment.name));
    }
    header.push_str(&format!(" {:>8}", "MeanPos"));
    println!("{header}");

    for entry in evolution {
        let mut line = format!("{:6}", entry.driver);
        for position in &entry.positions {
            match position {
                Some(position) => line.push_str(&format!(" {:>18}", format!("P{position}"))),
                None => line.push_str(&format!(" {:>18}", "-")),
            }
        }
        line.push_str(&format!(" {:>8.2}", entry.mean_position));
        println!("{line}");
    }
}

pub fn export_adjusted<P: AsRef<Path>>(path: P, laps: &[AdjustedLap]) -> Result<()> {
    let file = File::create(path)?;
    write_adjusted(file, laps)
}

pub fn write_adjusted<W: Write>(writer: W, laps: &[AdjustedLap]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for lap in laps {
        writer.serialize(lap)?;
    }
    writer.flush()?;
    Ok(())
}
