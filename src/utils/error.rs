use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteOpsError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required programs: {}", missing.join(", "))]
    MissingDependencies { missing: Vec<String> },

    #[error("Command '{program}' failed: {message}")]
    CommandError { program: String, message: String },

    #[error("Command '{program}' timed out after {seconds}s")]
    CommandTimeout { program: String, seconds: u64 },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Environment,
    Network,
    Processing,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteOpsError {
    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn command(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandError {
            program: program.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::MissingDependencies { .. } => ErrorCategory::Environment,
            Self::HttpError(_) => ErrorCategory::Network,
            Self::IoError(_) | Self::WalkError(_) | Self::ZipError(_) => ErrorCategory::Storage,
            Self::SerializationError(_)
            | Self::CommandError { .. }
            | Self::CommandTimeout { .. }
            | Self::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Environment => ErrorSeverity::Critical,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Processing => ErrorSeverity::Low,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingDependencies { .. } => {
                "Install the missing programs and make sure they are on PATH".to_string()
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the command line flags and the configuration file".to_string()
            }
            Self::HttpError(_) => "Check network connectivity and the target URL".to_string(),
            Self::CommandTimeout { .. } => {
                "Raise command_timeout_seconds or check the input file".to_string()
            }
            Self::CommandError { program, .. } => {
                format!("Run '{}' manually on the same input to see its output", program)
            }
            Self::IoError(_) | Self::WalkError(_) | Self::ZipError(_) => {
                "Check file permissions and free disk space".to_string()
            }
            Self::SerializationError(_) | Self::ProcessingError { .. } => {
                "Re-run with --verbose for details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingDependencies { missing } => {
                format!("Required programs not found: {}", missing.join(", "))
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteOpsError>;
