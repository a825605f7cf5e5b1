//! Error types
//!
//! Failure taxonomy for the swap client. Validation and precondition errors
//! are raised before any transaction is submitted; remote rejections carry
//! the phase of the instruction sequence that failed.

use thiserror::Error;

/// Phase of an offer lifecycle operation.
///
/// Every submitted transaction is assembled as an ordered instruction
/// sequence; when the cluster rejects it, the failing instruction index is
/// mapped back to the phase that contributed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Auxiliary account creation prepended before the core call
    Precheck,
    /// Native SOL wrap (transfer + sync) before the core call
    Wrap,
    /// The escrow program instruction itself
    Core,
    /// Post-settlement unwrap/close instructions
    Cleanup,
    /// Transaction-level failure not attributable to one instruction
    Submission,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::Precheck => "precheck",
            Phase::Wrap => "wrap",
            Phase::Core => "core instruction",
            Phase::Cleanup => "cleanup",
            Phase::Submission => "submission",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("cannot swap a token for itself")]
    SameMint,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("only the offer maker can refund")]
    UnauthorizedRefund,

    #[error("required account is missing: {0}")]
    MissingAccount(String),

    #[error("failed to encode instruction: {0}")]
    Encode(String),

    #[error("malformed account data: {0}")]
    AccountData(String),

    #[error("transaction rejected during {phase}: {reason}")]
    Rejected { phase: Phase, reason: String },

    #[error("rpc failure: {0}")]
    Rpc(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("signer unavailable: {0}")]
    Signer(String),
}

impl From<reqwest::Error> for SwapError {
    fn from(e: reqwest::Error) -> Self {
        SwapError::Rpc(e.to_string())
    }
}
