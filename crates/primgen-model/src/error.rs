use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid type path: {0:?}")]
    InvalidTypePath(String),
    #[error("unknown load state: {0}")]
    UnknownState(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
