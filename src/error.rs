use thiserror::Error;

#[derive(Error, Debug)]
pub enum IncomeLedgerError {
    #[error("Missing '{0}' in analysis payload")]
    MissingPayload(String),

    #[error("Invalid analysis payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Expected at least 2 table fragments, found {found}")]
    InsufficientFragments { found: usize },

    #[error("No anchor row found in table {table_index}: column layout cannot be established")]
    AnchorNotFound { table_index: usize },

    #[error("Invalid layout profile: {0}")]
    InvalidProfile(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IncomeLedgerError>;
