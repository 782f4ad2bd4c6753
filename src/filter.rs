use crate::config::AnalysisConfig;
use crate::data::Lap;

// Pure filter: no error path. An empty result is a valid outcome that the
// ranking stage turns into empty tables downstream.
pub fn pace_laps(laps: &[Lap], config: &AnalysisConfig) -> Vec<Lap> {
    laps.iter()
        .filter(|lap| is_representative(lap, config))
        .cloned()
        .collect()
}

pub fn is_representative(lap: &Lap, config: &AnalysisConfig) -> bool {
    if !config.outlier_bounds.contains(lap.time_seconds) {
        return false;
    }
    if lap.is_pit_lap {
        return false;
    }
    if config.exclude_neutralized && lap.track_status.is_neutralized() {
        return false;
    }
    true
}
