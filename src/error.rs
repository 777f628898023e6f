use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by point set construction and index queries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A parameter was rejected: `k` larger than the point count, a query against an
    /// empty index, or a malformed coordinate buffer.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A member index outside `[0, len)`.
    #[error("point index {index} out of range for {len} points")]
    OutOfRange { index: usize, len: usize },
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
