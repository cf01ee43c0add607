use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Export failed: {message}")]
    ExportError { message: String },

    #[error("Print failed: {message}")]
    PrintError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Io,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::ApiError(_) | ClientError::UrlError(_) => ErrorCategory::Network,
            ClientError::ConfigError { .. }
            | ClientError::ConfigValidationError { .. }
            | ClientError::InvalidConfigValueError { .. }
            | ClientError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ClientError::CsvError(_)
            | ClientError::SerializationError(_)
            | ClientError::ValidationError { .. } => ErrorCategory::Data,
            ClientError::IoError(_) => ErrorCategory::Io,
            ClientError::ZipError(_)
            | ClientError::ExportError { .. }
            | ClientError::PrintError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::ApiError(e) if e.is_connect() => {
                "Could not reach the grading server".to_string()
            }
            ClientError::ApiError(_) => "The grading server request failed".to_string(),
            ClientError::ValidationError { message } => format!("Invalid input: {}", message),
            ClientError::PrintError { message } => format!("Printing failed: {}", message),
            ClientError::ExportError { message } => format!("Export failed: {}", message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the base URL and your network connection, then retry",
            ErrorCategory::Configuration => "Review the configuration file and CLI flags",
            ErrorCategory::Data => "Check the input values and file format",
            ErrorCategory::Io => "Check file permissions and available disk space",
            ErrorCategory::Output => "Check the print command and output directory",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
