use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::{AnalysisConfig, SegmentSpec};
use crate::normalize::AdjustedLap;
use crate::segment;

#[derive(Debug, Clone)]
pub struct RankedDriver {
    pub driver: String,
    pub mean_seconds: f64,
    pub lap_count: usize,
    pub std_dev_seconds: f64,
    pub best_seconds: f64,
}

/// One segment's ordering, fastest mean first. Empty when no driver reached
/// the minimum lap count.
#[derive(Debug, Clone)]
pub struct SegmentRanking {
    pub segment: SegmentSpec,
    pub entries: Vec<RankedDriver>,
}

pub fn rank_segment(
    laps: &[AdjustedLap],
    segment: &SegmentSpec,
    config: &AnalysisConfig,
) -> SegmentRanking {
    let mut by_driver: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for lap in segment::laps_in_segment(laps, segment) {
        by_driver
            .entry(lap.driver.as_str())
            .or_default()
            .push(lap.adjusted_seconds);
    }

    let mut entries: Vec<RankedDriver> = by_driver
        .into_iter()
        .filter(|(_, times)| times.len() >= config.min_laps_per_segment)
        .map(|(driver, times)| summarize(driver, &times))
        .collect();

    // Equal means fall back to the driver id so the order is deterministic.
    entries.sort_by(|a, b| {
        a.mean_seconds
            .partial_cmp(&b.mean_seconds)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.driver.cmp(&b.driver))
    });

    SegmentRanking {
        segment: segment.clone(),
        entries,
    }
}

fn summarize(driver: &str, times: &[f64]) -> RankedDriver {
    let lap_count = times.len();
    let mean = times.iter().sum::<f64>() / lap_count as f64;
    let variance = if lap_count > 1 {
        times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (lap_count - 1) as f64
    } else {
        0.0
    };
    let best = times
        .iter()
        .copied()
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(mean);

    RankedDriver {
        driver: driver.to_string(),
        mean_seconds: mean,
        lap_count,
        std_dev_seconds: variance.sqrt(),
        best_seconds: best,
    }
}

/// Where each ranked driver finished across the segments. `positions` is
/// parallel to the ranking list; None marks a segment the driver did not
/// qualify for.
#[derive(Debug, Clone)]
pub struct DriverEvolution {
    pub driver: String,
    pub positions: Vec<Option<usize>>,
    pub mean_position: f64,
}

pub fn driver_evolution(rankings: &[SegmentRanking]) -> Vec<DriverEvolution> {
    let mut slots: BTreeMap<&str, Vec<Option<usize>>> = BTreeMap::new();
    for (segment_index, ranking) in rankings.iter().enumerate() {
        for (position, entry) in ranking.entries.iter().enumerate() {
            slots
                .entry(entry.driver.as_str())
                .or_insert_with(|| vec![None; rankings.len()])[segment_index] = Some(position + 1);
        }
    }

    let mut evolutions: Vec<DriverEvolution> = slots
        .into_iter()
        .map(|(driver, positions)| {
            let ranked: Vec<usize> = positions.iter().flatten().copied().collect();
            let mean_position = ranked.iter().sum::<usize>() as f64 / ranked.len() as f64;
            DriverEvolution {
                driver: driver.to_string(),
                positions,
                mean_position,
            }
        })
        .collect();

    evolutions.sort_by(|a, b| {
        a.mean_position
            .partial_cmp(&b.mean_position)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.driver.cmp(&b.driver))
    });
    evolutions
}
