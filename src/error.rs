use std::io;

use thiserror::Error;

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

// Errors surfaced by the analysis pipeline. Per-record problems carry enough
// context to name the offending row or lap in the abort message.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed lap record at row {row}: bad or missing {field}")]
    Data { row: usize, field: String },

    #[error("unrecognized compound \"{compound}\" (driver {driver}, lap {lap})")]
    UnrecognizedCompound {
        compound: String,
        driver: String,
        lap: u32,
    },
}

impl AnalysisError {
    pub fn config(message: impl Into<String>) -> Self {
        AnalysisError::Config(message.into())
    }

    pub fn data(row: usize, field: impl Into<String>) -> Self {
        AnalysisError::Data {
            row,
            field: field.into(),
        }
    }
}
