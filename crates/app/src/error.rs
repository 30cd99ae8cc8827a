use aggregate::UsageError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("missing or invalid API token")]
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match &err {
            AppError::InvalidInput(_) => (400, Some("invalid_input")),
            AppError::Config(_) | AppError::Usage(UsageError::InvalidConfig(_)) => {
                (400, Some("invalid_config"))
            }
            AppError::Unauthorized => (401, Some("unauthorized")),
            AppError::Usage(UsageError::MissingBackingObject { .. }) => {
                (500, Some("missing_backing_object"))
            }
            AppError::Usage(UsageError::InvalidResourceId(_)) => (500, Some("invalid_resource_id")),
            AppError::Usage(UsageError::BackendUnavailable { .. }) => {
                (502, Some("backend_unavailable"))
            }
            AppError::Usage(UsageError::Timeout { .. }) => (504, Some("backend_timeout")),
            AppError::Io(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code: code.map(str::to_string),
        }
    }
}
