// Clip Sampler Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing columns in manifest: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Missing value for '{column}' in row {row}")]
    MissingValue { row: usize, column: String },

    #[error("Invalid value '{value}' for '{column}' in row {row}")]
    InvalidValue { row: usize, column: String, value: String },

    #[error("Duplicate clip id: {0}")]
    DuplicateId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No rows left after filtering")]
    NoSurvivors,

    #[error("No group ids parsed from manifest; check paths")]
    NoGroups,

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, SamplerError>;
