use std::collections::BTreeMap;

use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};

use crate::data::Compound;
use crate::normalize::AdjustedLap;

// Fits need a handful of points before the slope means anything.
const MIN_FIT_LAPS: usize = 5;

/// Observed drift of raw lap time with tire age for one compound. Reported
/// next to the configured degradation rate as a sanity check; raw times are
/// used so the fit stays independent of the correction under test.
#[derive(Debug, Clone)]
pub struct DegradationTrend {
    pub compound: Compound,
    pub lap_count: usize,
    pub seconds_per_age_lap: f64,
    pub base_seconds: f64,
}

pub fn fit_trends(laps: &[AdjustedLap]) -> Vec<DegradationTrend> {
    let mut by_compound: BTreeMap<Compound, Vec<&AdjustedLap>> = BTreeMap::new();
    for lap in laps {
        by_compound.entry(lap.compound).or_default().push(lap);
    }

    by_compound
        .into_iter()
        .filter_map(|(compound, laps)| fit_compound(compound, &laps))
        .collect()
}

fn fit_compound(compound: Compound, laps: &[&AdjustedLap]) -> Option<DegradationTrend> {
    if laps.len() < MIN_FIT_LAPS {
        return None;
    }

    let ages: Vec<f64> = laps.iter().map(|lap| lap.tyre_age as f64).collect();
    let times: Vec<f64> = laps.iter().map(|lap| lap.raw_seconds).collect();

    let x = Array2::from_shape_vec((laps.len(), 1), ages).ok()?;
    let y = Array1::from_vec(times);
    let ds = Dataset::new(x, y);

    let fit = LinearRegression::new().fit(&ds).ok()?;
    Some(DegradationTrend {
        compound,
        lap_count: laps.len(),
        seconds_per_age_lap: fit.params()[0],
        base_seconds: fit.intercept(),
    })
}
