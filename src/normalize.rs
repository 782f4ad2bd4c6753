use serde::Serialize;
use tracing::warn;

use crate::config::{AnalysisConfig, RecordPolicy};
use crate::data::{Compound, Lap};
use crate::error::{AnalysisError, Result};

/// A lap with its tire correction applied. Only meaningful for laps that
/// passed the pace filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedLap {
    pub driver: String,
    pub lap_number: u32,
    pub compound: Compound,
    pub tyre_age: u32,
    pub wet: bool,
    pub raw_seconds: f64,
    pub adjustment_seconds: f64,
    pub adjusted_seconds: f64,
}

pub fn adjust_laps(laps: &[Lap], config: &AnalysisConfig) -> Result<Vec<AdjustedLap>> {
    let mut adjusted = Vec::with_capacity(laps.len());
    for lap in laps {
        match adjust_lap(lap, config) {
            Ok(lap) => adjusted.push(lap),
            Err(err) => {
                if config.on_unknown_compound == RecordPolicy::Abort {
                    return Err(err);
                }
                warn!(driver = %lap.driver, lap = lap.lap_number, error = %err, "dropping lap without a compound delta");
            }
        }
    }
    Ok(adjusted)
}

// adjusted = raw - delta[compound] - degradation, where the degradation term
// exists only when the configured rule matches the lap.
pub fn adjust_lap(lap: &Lap, config: &AnalysisConfig) -> Result<AdjustedLap> {
    let delta = config.delta_for(lap.compound).ok_or_else(|| {
        AnalysisError::UnrecognizedCompound {
            compound: lap.compound.to_string(),
            driver: lap.driver.clone(),
            lap: lap.lap_number,
        }
    })?;

    let degradation = if config.degradation.applies_to(lap.compound, lap.wet) {
        config.degradation.seconds_per_lap * lap.tyre_age as f64
    } else {
        0.0
    };

    let adjustment_seconds = delta + degradation;
    Ok(AdjustedLap {
        driver: lap.driver.clone(),
        lap_number: lap.lap_number,
        compound: lap.compound,
        tyre_age: lap.tyre_age,
        wet: lap.wet,
        raw_seconds: lap.time_seconds,
        adjustment_seconds,
        adjusted_seconds: lap.time_seconds - adjustment_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Compound, TrackStatus};

    const EPS: f64 = 1e-9;

    fn lap(raw: f64, compound: Compound, tyre_age: u32, wet: bool) -> Lap {
        Lap {
            driver: "A".to_string(),
            lap_number: 5,
            time_seconds: raw,
            compound,
            tyre_age,
            track_status: TrackStatus::Normal,
            is_pit_lap: false,
            wet,
        }
    }

    #[test]
    fn intermediate_in_the_wet_pays_for_tire_age() {
        let config = AnalysisConfig::default();
        let adjusted = adjust_lap(&lap(110.0, Compound::Intermediate, 2, true), &config).unwrap();
        assert!(
            (adjusted.adjusted_seconds - 109.8).abs() < EPS,
            "expected 109.8, got {}",
            adjusted.adjusted_seconds
        );
        assert!((adjusted.adjustment_seconds - 0.2).abs() < EPS);
    }

    #[test]
    fn soft_in_the_dry_loses_only_the_compound_delta() {
        let config = AnalysisConfig::default();
        let adjusted = adjust_lap(&lap(95.0, Compound::Soft, 4, false), &config).unwrap();
        assert!(
            (adjusted.adjusted_seconds - 87.0).abs() < EPS,
            "expected 87.0, got {}",
            adjusted.adjusted_seconds
        );
    }

    #[test]
    fn full_wet_compound_gets_time_back() {
        let config = AnalysisConfig::default();
        let adjusted = adjust_lap(&lap(100.0, Compound::Wet, 6, true), &config).unwrap();
        assert!((adjusted.adjusted_seconds - 103.0).abs() < EPS);
    }

    #[test]
    fn intermediate_in_the_dry_has_no_degradation_term() {
        let config = AnalysisConfig::default();
        let adjusted = adjust_lap(&lap(110.0, Compound::Intermediate, 9, false), &config).unwrap();
        assert!((adjusted.adjusted_seconds - 110.0).abs() < EPS);
    }

    #[test]
    fn rule_without_wet_only_applies_in_the_dry_too() {
        let mut config = AnalysisConfig::default();
        config.degradation.wet_only = false;
        let adjusted = adjust_lap(&lap(110.0, Compound::Intermediate, 9, false), &config).unwrap();
        assert!((adjusted.adjusted_seconds - 109.1).abs() < EPS);
    }

    #[test]
    fn every_default_compound_matches_the_formula() {
        let config = AnalysisConfig::default();
        for (compound, delta) in [
            (Compound::Intermediate, 0.0),
            (Compound::Soft, 8.0),
            (Compound::Medium, 6.0),
            (Compound::Hard, 4.0),
            (Compound::Wet, -3.0),
        ] {
            let adjusted = adjust_lap(&lap(100.0, compound, 0, false), &config).unwrap();
            assert!(
                (adjusted.adjusted_seconds - (100.0 - delta)).abs() < EPS,
                "compound {compound} should shed {delta}"
            );
        }
    }

    #[test]
    fn missing_delta_aborts_by_default() {
        let mut config = AnalysisConfig::default();
        config.compound_deltas.remove(&Compound::Wet);
        let laps = vec![lap(100.0, Compound::Wet, 1, true)];
        let err = adjust_laps(&laps, &config).unwrap_err();
        assert!(matches!(err, AnalysisError::UnrecognizedCompound { .. }));
    }

    #[test]
    fn missing_delta_can_be_skipped() {
        let mut config = AnalysisConfig::default();
        config.compound_deltas.remove(&Compound::Wet);
        config.on_unknown_compound = RecordPolicy::Skip;
        let laps = vec![
            lap(100.0, Compound::Wet, 1, true),
            lap(110.0, Compound::Intermediate, 0, true),
        ];
        let adjusted = adjust_laps(&laps, &config).unwrap();
        assert_eq!(adjusted.len(), 1);
        assert_eq!(adjusted[0].compound, Compound::Intermediate);
    }
}
