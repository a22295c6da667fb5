use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Rate request failed: {message}")]
    RateRequest { message: String },

    #[error("Transit time lookup failed: {message}")]
    TransitLookup { message: String },

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("Malformed carrier response: {message}")]
    MalformedResponse { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Carrier,
    ReferenceData,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a run that ended with this error. Always
    /// non-zero: a reported error never looks like success.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Low | Self::High => 1,
            Self::Medium => 2, // 承運商暫時失敗
            Self::Critical => 3,
        }
    }
}

impl RateError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn rate_request(message: impl Into<String>) -> Self {
        Self::RateRequest {
            message: message.into(),
        }
    }

    pub fn transit_lookup(message: impl Into<String>) -> Self {
        Self::TransitLookup {
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth { .. } => ErrorCategory::Auth,
            Self::RateRequest { .. }
            | Self::TransitLookup { .. }
            | Self::MalformedResponse { .. }
            | Self::Http(_) => ErrorCategory::Carrier,
            Self::NotFound { .. } | Self::Csv(_) => ErrorCategory::ReferenceData,
            Self::Config { .. } | Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                ErrorCategory::Configuration
            }
            Self::Validation { .. } => ErrorCategory::Input,
            Self::Io(_) | Self::Serialization(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 只影響預估品質，不阻擋報價
            Self::TransitLookup { .. } => ErrorSeverity::Low,
            Self::RateRequest { .. } | Self::MalformedResponse { .. } | Self::Http(_) => {
                ErrorSeverity::Medium
            }
            Self::Auth { .. }
            | Self::NotFound { .. }
            | Self::Validation { .. }
            | Self::Csv(_)
            | Self::Config { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. } => ErrorSeverity::High,
            Self::Io(_) | Self::Serialization(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether the error stops a rate check outright.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::TransitLookup { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Auth { .. } => "Unable to get access token.".to_string(),
            Self::RateRequest { message } => format!("API request failed: {}", message),
            Self::TransitLookup { .. } => {
                "Delivery commitments are unavailable; showing estimates instead.".to_string()
            }
            Self::NotFound { kind, key } => format!("{} '{}' was not found.", kind, key),
            Self::MalformedResponse { .. } => {
                "The carrier returned a response that could not be read.".to_string()
            }
            Self::Http(e) => format!("Could not reach the carrier: {}", e),
            Self::Validation { message } => format!("Invalid shipment: {}", message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Auth => {
                "Check FEDEX_CLIENT_ID / FEDEX_CLIENT_SECRET or the [carrier] section of the config"
            }
            ErrorCategory::Carrier => "Retry shortly; the carrier API may be unavailable",
            ErrorCategory::ReferenceData => {
                "Verify the product number or ZIP code exists in the reference CSV files"
            }
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::Input => "Weight and dimensions must be greater than zero",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
