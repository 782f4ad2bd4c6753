use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{AnalysisConfig, RecordPolicy};
use crate::error::{AnalysisError, Result};

/// Tire compound fitted for a lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
}

impl Compound {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "SOFT" => Some(Compound::Soft),
            "MEDIUM" => Some(Compound::Medium),
            "HARD" => Some(Compound::Hard),
            "INTERMEDIATE" => Some(Compound::Intermediate),
            "WET" => Some(Compound::Wet),
            _ => None,
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
            Compound::Intermediate => "INTERMEDIATE",
            Compound::Wet => "WET",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    Normal,
    SafetyCar,
    RedFlag,
}

impl TrackStatus {
    // Telemetry status strings concatenate digit codes: '4' safety car,
    // '5' red flag, '6'/'7' virtual safety car phases. A red flag wins
    // over anything else in the same string.
    pub fn from_codes(codes: &str) -> Self {
        if codes.contains('5') {
            TrackStatus::RedFlag
        } else if codes.chars().any(|c| matches!(c, '4' | '6' | '7')) {
            TrackStatus::SafetyCar
        } else {
            TrackStatus::Normal
        }
    }

    pub fn is_neutralized(&self) -> bool {
        !matches!(self, TrackStatus::Normal)
    }
}

/// One validated lap of the session. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Lap {
    pub driver: String,
    pub lap_number: u32,
    pub time_seconds: f64,
    pub compound: Compound,
    pub tyre_age: u32,
    pub track_status: TrackStatus,
    pub is_pit_lap: bool,
    pub wet: bool,
}

// Column mapping for the telemetry CSV export. Lap numbers and tyre life
// arrive as floats; pit columns carry a session timestamp when the lap
// touched the pit lane and are empty otherwise.
#[derive(Debug, Deserialize)]
struct RawLapRecord {
    #[serde(rename = "Driver")]
    driver: String,
    #[serde(rename = "LapNumber")]
    lap_number: Option<f64>,
    #[serde(rename = "LapTimeSeconds")]
    lap_time_seconds: Option<f64>,
    #[serde(rename = "Compound")]
    compound: Option<String>,
    #[serde(rename = "TyreLife")]
    tyre_life: Option<f64>,
    #[serde(rename = "TrackStatus")]
    track_status: Option<String>,
    #[serde(rename = "PitOutTime")]
    pit_out_time: Option<String>,
    #[serde(rename = "PitInTime")]
    pit_in_time: Option<String>,
    #[serde(rename = "Rainfall")]
    rainfall: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    /// Rows dropped only because their driver is outside `target_drivers`.
    pub rows_ignored: usize,
}

pub fn load_laps<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> Result<(Vec<Lap>, LoadSummary)> {
    let file = File::open(path)?;
    read_laps(file, config)
}

pub fn read_laps<R: Read>(input: R, config: &AnalysisConfig) -> Result<(Vec<Lap>, LoadSummary)> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);
    let mut laps = Vec::new();
    let mut summary = LoadSummary::default();

    for (index, record) in reader.deserialize::<RawLapRecord>().enumerate() {
        // +2: one for the header line, one for 1-based numbering.
        let row = index + 2;
        summary.rows_read += 1;

        let raw = match record {
            Ok(raw) => raw,
            Err(err) => {
                if config.on_bad_record == RecordPolicy::Abort {
                    return Err(err.into());
                }
                summary.rows_skipped += 1;
                warn!(row, error = %err, "dropping unreadable record");
                continue;
            }
        };

        let lap = match lap_from_raw(raw, row) {
            Ok(lap) => lap,
            Err(err @ AnalysisError::UnrecognizedCompound { .. }) => {
                if config.on_unknown_compound == RecordPolicy::Abort {
                    return Err(err);
                }
                summary.rows_skipped += 1;
                warn!(row, error = %err, "dropping lap");
                continue;
            }
            Err(err) => {
                if config.on_bad_record == RecordPolicy::Abort {
                    return Err(err);
                }
                summary.rows_skipped += 1;
                warn!(row, error = %err, "dropping lap");
                continue;
            }
        };

        if let Some(targets) = &config.target_drivers {
            if !targets.iter().any(|d| d == &lap.driver) {
                summary.rows_ignored += 1;
                debug!(row, driver = %lap.driver, "driver outside analysis scope");
                continue;
            }
        }

        laps.push(lap);
    }

    laps.sort_by(|a, b| {
        a.lap_number
            .cmp(&b.lap_number)
            .then_with(|| a.driver.cmp(&b.driver))
    });
    Ok((laps, summary))
}

fn lap_from_raw(raw: RawLapRecord, row: usize) -> Result<Lap> {
    let driver = raw.driver.trim().to_string();
    if driver.is_empty() {
        return Err(AnalysisError::data(row, "Driver"));
    }

    let lap_number = match raw.lap_number {
        Some(n) if n.is_finite() && n >= 1.0 => n.round() as u32,
        _ => return Err(AnalysisError::data(row, "LapNumber")),
    };

    let time_seconds = match raw.lap_time_seconds {
        Some(t) if t.is_finite() && t > 0.0 => t,
        _ => return Err(AnalysisError::data(row, "LapTimeSeconds")),
    };

    let compound_name = match raw.compound {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err(AnalysisError::data(row, "Compound")),
    };
    let compound = Compound::from_name(&compound_name).ok_or_else(|| {
        AnalysisError::UnrecognizedCompound {
            compound: compound_name.trim().to_string(),
            driver: driver.clone(),
            lap: lap_number,
        }
    })?;

    let tyre_age = match raw.tyre_life {
        Some(age) if age.is_finite() && age >= 0.0 => age.round() as u32,
        _ => return Err(AnalysisError::data(row, "TyreLife")),
    };

    let track_status = raw
        .track_status
        .as_deref()
        .map_or(TrackStatus::Normal, TrackStatus::from_codes);

    let has_value = |field: &Option<String>| {
        field.as_deref().map_or(false, |s| !s.trim().is_empty())
    };
    let is_pit_lap = has_value(&raw.pit_out_time) || has_value(&raw.pit_in_time);

    let wet = raw
        .rainfall
        .as_deref()
        .map_or(false, |s| s.trim().eq_ignore_ascii_case("true"));

    Ok(Lap {
        driver,
        lap_number,
        time_seconds,
        compound,
        tyre_age,
        track_status,
        is_pit_lap,
        wet,
    })
}

/// Compound usage and weather for the whole loaded session, before the
/// pace filter is applied.
#[derive(Debug, Clone)]
pub struct SessionOverview {
    pub total_laps: usize,
    pub compound_counts: BTreeMap<Compound, usize>,
    pub wet_fraction: f64,
}

pub fn session_overview(laps: &[Lap]) -> SessionOverview {
    let mut compound_counts: BTreeMap<Compound, usize> = BTreeMap::new();
    let mut wet_laps = 0usize;
    for lap in laps {
        *compound_counts.entry(lap.compound).or_insert(0) += 1;
        if lap.wet {
            wet_laps += 1;
        }
    }
    let total_laps = laps.len();
    let wet_fraction = if total_laps == 0 {
        0.0
    } else {
        wet_laps as f64 / total_laps as f64
    };
    SessionOverview {
        total_laps,
        compound_counts,
        wet_fraction,
    }
}
