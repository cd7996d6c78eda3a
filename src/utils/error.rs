use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("QR encoding failed: {message}")]
    EncodingError { message: String },

    #[error("QR rendering failed: {message}")]
    RenderError { message: String },

    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unauthorized: session is no longer valid")]
    Unauthorized,

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Qr,
    Network,
    Auth,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdminError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdminError::EncodingError { .. } | AdminError::RenderError { .. } => ErrorCategory::Qr,
            AdminError::RequestError(_) | AdminError::ApiError { .. } => ErrorCategory::Network,
            AdminError::Unauthorized => ErrorCategory::Auth,
            AdminError::NotFound { .. }
            | AdminError::InvalidValueError { .. }
            | AdminError::MissingFieldError { .. }
            | AdminError::SerializationError(_)
            | AdminError::ProcessingError { .. } => ErrorCategory::Data,
            AdminError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AdminError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdminError::NotFound { .. } => ErrorSeverity::Low,
            AdminError::RequestError(_) | AdminError::ApiError { .. } => ErrorSeverity::Medium,
            AdminError::EncodingError { .. }
            | AdminError::Unauthorized
            | AdminError::InvalidValueError { .. }
            | AdminError::MissingFieldError { .. }
            | AdminError::SerializationError(_)
            | AdminError::ProcessingError { .. }
            | AdminError::ConfigValidationError { .. } => ErrorSeverity::High,
            AdminError::RenderError { .. } | AdminError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdminError::EncodingError { .. } => {
                "The QR code could not be generated for this text".to_string()
            }
            AdminError::RenderError { .. } => "The QR code image could not be drawn".to_string(),
            AdminError::RequestError(_) => "Could not reach the shop API".to_string(),
            AdminError::ApiError { message, .. } => format!("The shop API rejected the request: {}", message),
            AdminError::Unauthorized => "You are signed out, please sign in again".to_string(),
            AdminError::NotFound { resource, id } => format!("{} '{}' does not exist", resource, id),
            AdminError::InvalidValueError { field, reason, .. } => format!("{}: {}", field, reason),
            AdminError::MissingFieldError { field } => format!("{} is required", field),
            AdminError::ConfigValidationError { field, .. } => {
                format!("Configuration problem in '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Qr => match self {
                AdminError::EncodingError { .. } => {
                    "Use a non-empty, shorter verification URL"
                }
                _ => "Choose a size between the symbol width and qr.max_size",
            },
            ErrorCategory::Network => "Check api.base_url and your network connection, then retry",
            ErrorCategory::Auth => "Check api.email / api.password and sign in again",
            ErrorCategory::Data => "Fix the highlighted field and submit again",
            ErrorCategory::Configuration => "Review the TOML configuration file",
            ErrorCategory::System => "Check file permissions and free disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

/// 疊加圖片載入失敗；合成器內部處理，不會回傳給呼叫端
#[derive(Error, Debug)]
pub enum OverlayLoadError {
    #[error("overlay source is empty")]
    EmptySource,

    #[error("failed to fetch overlay: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("overlay server responded with HTTP {0}")]
    Status(u16),

    #[error("overlay source is not an http(s) or data URL: {0}")]
    UnsupportedSource(String),

    #[error("failed to read overlay file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data URL: {0}")]
    DataUrl(String),

    #[error("failed to decode overlay image: {0}")]
    Decode(#[from] image::ImageError),
}
