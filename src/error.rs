//! Error type shared by the whole crate.
//!
//! Only recoverable conditions live here: invalid configuration, malformed
//! instance data, chromosome parsing and I/O. Programming faults such as
//! deleting a classifier that is not a member of a set panic instead.

use thiserror::Error;

/// Errors produced while configuring, training or persisting an LCS.
#[derive(Error, Debug)]
pub enum LcsError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid instances: {0}")]
    InvalidInstances(String),

    #[error("invalid chromosome: {0}")]
    InvalidChromosome(String),

    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, LcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = LcsError::InvalidConfig("mutation_rate out of range".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: mutation_rate out of range"
        );

        let err = LcsError::SizeMismatch {
            expected: 12,
            actual: 10,
        };
        assert_eq!(err.to_string(), "size mismatch: expected 12, got 10");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: LcsError = io.into();
        assert!(matches!(err, LcsError::Io(_)));
    }
}
