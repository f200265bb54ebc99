use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("invalid text: {0}")]
    InvalidText(String),
    #[error("invalid page: {0}")]
    InvalidPage(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
