use thiserror::Error;

pub mod orders;

pub use orders::{OrderDataset, CUSTOMER_STATE};

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("column {column}: cannot parse value {value:?}")]
    Field { column: &'static str, value: String },

    #[error("malformed CSV: {0}")]
    Malformed(String),
}
