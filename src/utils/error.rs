use thiserror::Error;

#[derive(Error, Debug)]
pub enum PokedexError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Unexpected upstream payload: {message}")]
    UnexpectedPayload { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

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

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Too many type filters: {count} selected, at most {max} allowed")]
    TooManyFilters { count: usize, max: usize },

    #[error("Invalid type filter: {message}")]
    InvalidFilter { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Configuration,
    Input,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a run that ended with this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl PokedexError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PokedexError::ApiError(_) => ErrorCategory::Network,
            PokedexError::UpstreamStatus { .. } | PokedexError::UnexpectedPayload { .. } => {
                ErrorCategory::Upstream
            }
            PokedexError::ConfigError { .. }
            | PokedexError::InvalidConfigValueError { .. }
            | PokedexError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            PokedexError::TooManyFilters { .. } | PokedexError::InvalidFilter { .. } => {
                ErrorCategory::Input
            }
            PokedexError::IoError(_) | PokedexError::SerializationError(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// Transient failures: timeouts, refused connections, 429 and 5xx answers.
    pub fn is_retryable(&self) -> bool {
        match self {
            PokedexError::ApiError(e) => e.is_timeout() || e.is_connect(),
            PokedexError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PokedexError::ApiError(_) => {
                "Check network connectivity and the upstream base URL, then retry"
            }
            PokedexError::UpstreamStatus { status, .. } if *status == 404 => {
                "Check the spelling of the requested type or Pokémon name"
            }
            PokedexError::UpstreamStatus { .. } => {
                "The upstream service is degraded; retry later"
            }
            PokedexError::UnexpectedPayload { .. } => {
                "Verify the base URL points at a PokeAPI compatible service"
            }
            PokedexError::ConfigError { .. }
            | PokedexError::InvalidConfigValueError { .. }
            | PokedexError::ConfigValidationError { .. } => {
                "Fix the configuration value and run again"
            }
            PokedexError::TooManyFilters { .. } => "Select at most two types",
            PokedexError::InvalidFilter { .. } => "Use a non-empty type name such as 'fire'",
            PokedexError::IoError(_) => "Check file paths and permissions",
            PokedexError::SerializationError(_) => "Report this as a bug",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PokedexError::ApiError(_) => "Could not reach the Pokémon data service".to_string(),
            PokedexError::UpstreamStatus { status, .. } => {
                format!("The Pokémon data service answered with status {}", status)
            }
            PokedexError::TooManyFilters { max, .. } => {
                format!("Please select up to {} types.", max)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PokedexError>;
