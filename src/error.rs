use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceivablesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Unknown date range preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown receivable: {0}")]
    UnknownReceivable(String),

    #[error("Invalid date: {0} (expected dd/mm/yyyy)")]
    InvalidDate(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReceivablesError>;
