use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned {status} for page {page}: {body}")]
    UpstreamStatus {
        status: u16,
        page: usize,
        body: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Upstream,
    Rendering,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ApiError(_)
            | ReportError::UpstreamStatus { .. }
            | ReportError::SerializationError(_) => ErrorCategory::Upstream,
            ReportError::PdfError(_) | ReportError::IoError(_) => ErrorCategory::Rendering,
            ReportError::ConfigError { .. }
            | ReportError::MissingConfigError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::ValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Upstream => 2,
            ErrorCategory::Rendering => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
