use thiserror::Error;

use crate::types::Network;

/// Top-level error for a payout run. Every variant is fatal: the caller
/// prints the diagnostic once and the process exits with status 1.
#[derive(Debug, Error)]
pub enum SpillwayError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("network mismatch: {entity} is on {found} while the selected network is {expected}")]
    NetworkMismatch {
        entity: String,
        expected: Network,
        found: Network,
    },

    #[error(
        "signing key does not correspond to the sender address; \
         check the signing_key and address entries in the configuration"
    )]
    CredentialMismatch,

    #[error("cancelled: {reason}")]
    Cancelled { reason: String },

    #[error("build error: {message}")]
    Build { message: String },

    #[error("chain query failed: {message}")]
    Chain { message: String },

    #[error("submission failed: {message}")]
    Submission { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpillwayError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn chain(message: impl ToString) -> Self {
        Self::Chain {
            message: message.to_string(),
        }
    }

    pub fn submission(message: impl ToString) -> Self {
        Self::Submission {
            message: message.to_string(),
        }
    }

    /// Cancellations are operator decisions, not defects; the CLI reports
    /// them without an error banner.
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, SpillwayError>;
