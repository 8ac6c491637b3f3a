//! Errors surfaced by a deployment run.

use std::time::Duration;

use alloy_core::primitives::B256;

/// Any failure raised while resolving, submitting, confirming or reporting a deployment.
///
/// The orchestrator never recovers from these: every variant is forwarded unchanged
/// to the caller, which decides how to surface it. The underlying error is kept as
/// the source so the full chain stays available for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    /// The contract artifact could not be found or loaded.
    #[error("failed to resolve contract factory")]
    Resolution(#[source] anyhow::Error),

    /// The deployment transaction could not be built, signed or accepted by the network.
    #[error("failed to submit deployment transaction")]
    Submission(#[source] anyhow::Error),

    /// The deployment transaction was dropped, reverted or reorganized out.
    #[error("deployment transaction {tx_hash} was not confirmed")]
    Confirmation {
        tx_hash: B256,
        #[source]
        source: anyhow::Error,
    },

    /// No confirmation arrived within the configured bound.
    ///
    /// `last_error` is the most recent failed poll, if the wait ended on one.
    #[error("timed out after {waited:?} waiting for deployment transaction {tx_hash}")]
    Timeout {
        tx_hash: B256,
        waited: Duration,
        #[source]
        last_error: Option<anyhow::Error>,
    },

    /// The deployment succeeded but the success record could not be emitted.
    #[error("failed to report deployment result")]
    Report(#[source] anyhow::Error),
}

impl DeploymentError {
    pub fn resolution(msg: impl std::fmt::Display) -> Self {
        Self::Resolution(anyhow::anyhow!("{msg}"))
    }

    pub fn submission(msg: impl std::fmt::Display) -> Self {
        Self::Submission(anyhow::anyhow!("{msg}"))
    }

    pub fn confirmation(tx_hash: B256, msg: impl std::fmt::Display) -> Self {
        Self::Confirmation {
            tx_hash,
            source: anyhow::anyhow!("{msg}"),
        }
    }

    /// The name of the error kind, as used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolution(_) => "ResolutionError",
            Self::Submission(_) => "SubmissionError",
            Self::Confirmation { .. } => "ConfirmationError",
            Self::Timeout { .. } => "TimeoutError",
            Self::Report(_) => "ReportError",
        }
    }
}
