#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("invalid catalog settings: {0}")]
    InvalidSettings(String),
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog action {action} failed (status {status}): {message}")]
    Action {
        action: String,
        status: u16,
        message: String,
    },
    #[error("catalog action {action} returned an unreadable response: {message}")]
    Decode { action: String, message: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
