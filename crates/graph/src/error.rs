#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("invalid graph endpoint {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("invalid graph settings: {0}")]
    InvalidSettings(String),
    #[error("refusing to query graph {0:?}: not a valid IRI")]
    InvalidIri(String),
    #[error("graph request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("graph endpoint answered with status {status}: {message}")]
    Endpoint { status: u16, message: String },
    #[error("unreadable graph query result: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
