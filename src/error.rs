//! Error types for resource tree construction
//!
//! Every failure surfaced to a caller carries an HTTP-style status code so the
//! dashboard glue can forward it unchanged.

use thiserror::Error;

/// Main error type for capiviz operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The named cluster or object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A CRD label or config value is outside the accepted set
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A call to the Kubernetes API failed
    #[error("{context}: {source}")]
    DependencyFailure {
        context: String,
        #[source]
        source: kube::Error,
    },

    /// An offline snapshot could not be read or parsed
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Unexpected state while assembling the tree
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a not-found error with the given message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid-configuration error with the given message
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Wrap a Kubernetes API error with a short description of the call
    pub fn dependency(context: impl Into<String>, source: kube::Error) -> Self {
        Self::DependencyFailure {
            context: context.into(),
            source,
        }
    }

    /// Create a snapshot error with the given message
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create an internal error with the given message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP-style status code for this error
    ///
    /// Only missing objects map to 404; everything else is a server-side failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::DependencyFailure { source, .. } if is_not_found(source) => 404,
            _ => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}

/// Check whether a kube error is an API 404
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}

/// Result type for capiviz operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
