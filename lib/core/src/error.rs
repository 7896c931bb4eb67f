use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid field ordinal: looking for field {ordinal}, found {found} fields in the record: {record}")]
    InvalidOrdinal {
        ordinal: usize,
        found: usize,
        record: String,
    },

    #[error("Invalid bucket count {0}: must be even and at least 2")]
    InvalidBucketCount(usize),

    #[error("Invalid delimiter pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Run cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
