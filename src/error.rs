use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjectifError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not connected to QuickBooks: {0}")]
    NotConnected(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("QuickBooks API error: {0}")]
    Api(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ObjectifError>;
