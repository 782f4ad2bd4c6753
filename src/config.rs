use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::Compound;
use crate::error::{AnalysisError, Result};

// How the pipeline reacts to a record it cannot use: drop it (with a warning
// and a count) or abort the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordPolicy {
    Skip,
    Abort,
}

/// The one degradation correction this methodology applies. It is named and
/// overridable because it models wear that mattered in the analyzed race,
/// not a general tire-physics law.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationRule {
    pub seconds_per_lap: f64,
    pub compound: Compound,
    pub wet_only: bool,
}

impl DegradationRule {
    pub fn applies_to(&self, compound: Compound, wet: bool) -> bool {
        compound == self.compound && (!self.wet_only || wet)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl OutlierBounds {
    // Both ends inclusive.
    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.min_seconds && seconds <= self.max_seconds
    }
}

/// A named, inclusive lap-number range. Configured ranges must be pairwise
/// disjoint; laps outside every range stay unsegmented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub name: String,
    pub first_lap: u32,
    pub last_lap: u32,
}

impl SegmentSpec {
    pub fn contains(&self, lap_number: u32) -> bool {
        lap_number >= self.first_lap && lap_number <= self.last_lap
    }

    fn overlaps(&self, other: &SegmentSpec) -> bool {
        self.first_lap <= other.last_lap && other.first_lap <= self.last_lap
    }
}

// Every tunable of the pipeline in one structure, passed into each stage.
// The defaults reproduce the Silverstone 2025 wet-race methodology.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub compound_deltas: BTreeMap<Compound, f64>,
    pub degradation: DegradationRule,
    pub min_laps_per_segment: usize,
    pub outlier_bounds: OutlierBounds,
    pub segments: Vec<SegmentSpec>,
    pub exclude_neutralized: bool,
    pub target_drivers: Option<Vec<String>>,
    pub on_bad_record: RecordPolicy,
    pub on_unknown_compound: RecordPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut compound_deltas = BTreeMap::new();
        compound_deltas.insert(Compound::Intermediate, 0.0);
        compound_deltas.insert(Compound::Soft, 8.0);
        compound_deltas.insert(Compound::Medium, 6.0);
        compound_deltas.insert(Compound::Hard, 4.0);
        compound_deltas.insert(Compound::Wet, -3.0);

        Self {
            compound_deltas,
            degradation: DegradationRule {
                seconds_per_lap: 0.1,
                compound: Compound::Intermediate,
                wet_only: true,
            },
            min_laps_per_segment: 3,
            outlier_bounds: OutlierBounds {
                min_seconds: 80.0,
                max_seconds: 200.0,
            },
            segments: vec![
                SegmentSpec {
                    name: "Early Wet Chaos".to_string(),
                    first_lap: 1,
                    last_lap: 15,
                },
                SegmentSpec {
                    name: "Heavy Rain Period".to_string(),
                    first_lap: 16,
                    last_lap: 34,
                },
                SegmentSpec {
                    name: "Drying Phase".to_string(),
                    first_lap: 35,
                    last_lap: 49,
                },
            ],
            exclude_neutralized: true,
            target_drivers: None,
            on_bad_record: RecordPolicy::Skip,
            on_unknown_compound: RecordPolicy::Abort,
        }
    }
}

impl AnalysisConfig {
    // Missing fields fall back to the defaults, so a config file only needs
    // the values it wants to change.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn delta_for(&self, compound: Compound) -> Option<f64> {
        self.compound_deltas.get(&compound).copied()
    }

    pub fn validate(&self) -> Result<()> {
        if self.compound_deltas.is_empty() {
            return Err(AnalysisError::config("compound delta table is empty"));
        }
        if !self.degradation.seconds_per_lap.is_finite() || self.degradation.seconds_per_lap < 0.0 {
            return Err(AnalysisError::config(format!(
                "degradation rate must be finite and non-negative, got {}",
                self.degradation.seconds_per_lap
            )));
        }
        if self.min_laps_per_segment == 0 {
            return Err(AnalysisError::config("min_laps_per_segment must be at least 1"));
        }
        let bounds = &self.outlier_bounds;
        if !bounds.min_seconds.is_finite()
            || !bounds.max_seconds.is_finite()
            || bounds.min_seconds <= 0.0
            || bounds.max_seconds <= bounds.min_seconds
        {
            return Err(AnalysisError::config(format!(
                "outlier bounds [{}, {}] are not a positive, ordered range",
                bounds.min_seconds, bounds.max_seconds
            )));
        }
        if self.segments.is_empty() {
            return Err(AnalysisError::config("no segments defined"));
        }
        for segment in &self.segments {
            if segment.name.trim().is_empty() {
                return Err(AnalysisError::config("segment with an empty name"));
            }
            if segment.first_lap == 0 || segment.last_lap < segment.first_lap {
                return Err(AnalysisError::config(format!(
                    "segment \"{}\" has an invalid lap range [{}, {}]",
                    segment.name, segment.first_lap, segment.last_lap
                )));
            }
        }
        for (i, a) in self.segments.iter().enumerate() {
            for b in &self.segments[i + 1..] {
                if a.overlaps(b) {
                    return Err(AnalysisError::config(format!(
                        "segments \"{}\" and \"{}\" overlap",
                        a.name, b.name
                    )));
                }
            }
        }
        Ok(())
    }
}
