//! Error types for trackctl

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode error: {0}")]
    Decode(#[from] openracing_telemetry_f1::DecodeError),

    #[error("Track error: {0}")]
    Track(#[from] openracing_track::TrackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidInput(_) => 2,
            CliError::Io(_) => 3,
            CliError::Decode(_) | CliError::Track(_) | CliError::Json(_) => 4,
        }
    }
}
