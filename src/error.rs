//! Error types.
//!
//! The library reports failures through [`ForecastError`]. The `pe` binary
//! converts those into [`AppError`], which carries the process exit code:
//!
//! - `2`: input problems (missing file, bad schema, unparseable period)
//! - `3`: data problems (invalid values, empty dataset)
//! - `4`: staging, fitting and forecasting problems

use thiserror::Error;

/// Library error for every pipeline stage.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Cannot parse period '{input}'{}: expected 'YYYY Qn' with n in 1..=4", fmt_line(.line))]
    Parse { input: String, line: Option<usize> },

    #[error("Invalid `{column}` value '{value}' on line {line}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("No observations found in '{source_name}'")]
    EmptyDataset { source_name: String },

    #[error("No data loaded. Call `load_data` first.")]
    NotLoaded,

    #[error("Features not prepared. Call `prepare_data` first.")]
    NotPrepared,

    #[error("Model not trained. Call `train_model` first.")]
    NotTrained,

    #[error("Scaler used before it was fitted")]
    ScalerNotFitted,

    #[error("Scaler is already fitted; reset it before fitting again")]
    ScalerAlreadyFitted,

    #[error("Model was trained with a different scaling state (trained with #{model}, got #{given})")]
    ScalingMismatch { model: u64, given: u64 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Forecast horizon must be between 1 and {} years (got {})", crate::forecast::MAX_YEARS, .0)]
    InvalidHorizon(u32),

    #[error("Non-finite prediction for {period}")]
    NonFinitePrediction { period: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn fmt_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" on line {l}")).unwrap_or_default()
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Exit code used by the binary for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ForecastError::Schema { .. }
            | ForecastError::Parse { .. }
            | ForecastError::Io(_)
            | ForecastError::Csv(_)
            | ForecastError::Json(_) => 2,
            ForecastError::InvalidValue { .. } | ForecastError::EmptyDataset { .. } => 3,
            _ => 4,
        }
    }
}

/// Application-level error: a message plus the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
