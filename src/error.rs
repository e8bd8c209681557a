// src/error.rs

use crate::protocol::Outcome;
use thiserror::Error;

/// Core error types for Packman
#[derive(Error, Debug)]
pub enum Error {
    /// Line does not match `VERB|NAME|DEPS`
    #[error("Malformed command: {line:?}")]
    MalformedCommand { line: String },

    /// Package declares a dependency the index does not know about
    #[error("Package '{package}' has a dependency on unknown package '{dependency}'")]
    UnknownDependency { package: String, dependency: String },

    /// Package is still required by other indexed packages
    #[error("Package '{package}' has dependents and cannot be removed")]
    HasDependents { package: String },

    /// Package is not in the index
    #[error("Package '{package}' not found")]
    NotFound { package: String },

    /// Unexpected fault while processing a command
    #[error("Internal error: {0}")]
    Internal(String),

    /// Peer sent something outside the wire protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wire outcome reported to the client for this error
    pub fn outcome(&self) -> Outcome {
        match self {
            Error::MalformedCommand { .. } => Outcome::Error,
            _ => Outcome::Fail,
        }
    }

    /// True for errors raised by the index invariants
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Error::UnknownDependency { .. } | Error::HasDependents { .. } | Error::NotFound { .. }
        )
    }
}

/// Result type alias using Packman's Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_maps_to_error_token() {
        let err = Error::MalformedCommand {
            line: "index|pkg".to_string(),
        };
        assert_eq!(err.outcome(), Outcome::Error);
        assert!(!err.is_rule_violation());
    }

    #[test]
    fn test_rule_violations_map_to_fail() {
        let errs = [
            Error::UnknownDependency {
                package: "p".to_string(),
                dependency: "x".to_string(),
            },
            Error::HasDependents {
                package: "x".to_string(),
            },
            Error::NotFound {
                package: "p".to_string(),
            },
        ];
        for err in &errs {
            assert!(err.is_rule_violation());
            assert_eq!(err.outcome(), Outcome::Fail);
        }
    }

    #[test]
    fn test_internal_fault_never_ok() {
        let err = Error::Internal("boom".to_string());
        assert_eq!(err.outcome(), Outcome::Fail);
    }

    #[test]
    fn test_error_messages() {
        let err = Error::UnknownDependency {
            package: "cloog".to_string(),
            dependency: "gmp".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Package 'cloog' has a dependency on unknown package 'gmp'"
        );
    }
}
