use crate::config::{AnalysisConfig, SegmentSpec};
use crate::normalize::AdjustedLap;

// Ranges are validated disjoint at config load, so the first match is the
// only match.
pub fn segment_of<'a>(config: &'a AnalysisConfig, lap_number: u32) -> Option<&'a SegmentSpec> {
    config
        .segments
        .iter()
        .find(|segment| segment.contains(lap_number))
}

pub fn laps_in_segment<'a>(laps: &'a [AdjustedLap], segment: &SegmentSpec) -> Vec<&'a AdjustedLap> {
    laps.iter()
        .filter(|lap| segment.contains(lap.lap_number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Compound;

    fn adjusted(lap_number: u32) -> AdjustedLap {
        AdjustedLap {
            driver: "NOR".to_string(),
            lap_number,
            compound: Compound::Intermediate,
            tyre_age: 1,
            wet: true,
            raw_seconds: 100.0,
            adjustment_seconds: 0.1,
            adjusted_seconds: 99.9,
        }
    }

    #[test]
    fn each_lap_lands_in_at_most_one_default_segment() {
        let config = AnalysisConfig::default();
        for lap_number in 1..=60 {
            let owners = config
                .segments
                .iter()
                .filter(|segment| segment.contains(lap_number))
                .count();
            assert!(owners <= 1, "lap {lap_number} owned by {owners} segments");
        }
    }

    #[test]
    fn boundary_laps_resolve_to_the_right_segment() {
        let config = AnalysisConfig::default();
        assert_eq!(segment_of(&config, 1).unwrap().name, "Early Wet Chaos");
        assert_eq!(segment_of(&config, 15).unwrap().name, "Early Wet Chaos");
        assert_eq!(segment_of(&config, 16).unwrap().name, "Heavy Rain Period");
        assert_eq!(segment_of(&config, 34).unwrap().name, "Heavy Rain Period");
        assert_eq!(segment_of(&config, 35).unwrap().name, "Drying Phase");
        assert_eq!(segment_of(&config, 49).unwrap().name, "Drying Phase");
    }

    #[test]
    fn laps_past_the_last_range_stay_unsegmented() {
        let config = AnalysisConfig::default();
        assert!(segment_of(&config, 50).is_none());
        assert!(segment_of(&config, 52).is_none());
    }

    #[test]
    fn bucketing_keeps_only_in_range_laps() {
        let config = AnalysisConfig::default();
        let laps = vec![adjusted(14), adjusted(15), adjusted(16), adjusted(50)];
        let first = laps_in_segment(&laps, &config.segments[0]);
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|lap| lap.lap_number <= 15));
    }
}
