//! Error types for the referrals crate.

use std::fmt;

use bridge_core::CoreError;

/// Errors returned by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No document of `model` matched `key`.
    #[error("{model} not found: {key}")]
    NotFound { model: &'static str, key: String },

    /// A document of `model` already exists for `key`.
    #[error("{model} already exists: {key}")]
    Conflict { model: &'static str, key: String },

    /// The store refused the write.
    #[error("{message}")]
    Rejected { message: String, code: u16 },

    /// The store connection is not usable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// HTTP-class status code for this error.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Rejected { code, .. } => *code,
            Self::Unavailable(_) => 503,
        }
    }
}

/// Errors returned by a [`MailTransport`](crate::mailer::MailTransport).
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The mail relay rejected the message.
    #[error("{0}")]
    Rejected(String),

    /// The mail relay could not be reached.
    #[error("{0}")]
    Unavailable(String),
}

/// Why a recipient may not be referred by a sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum IneligibleReason {
    /// The recipient is the sender.
    SelfReferral,
    /// The sender has already referred this recipient.
    AlreadyReferred,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfReferral => f.write_str("cannot refer yourself"),
            Self::AlreadyReferred => f.write_str("already referred"),
        }
    }
}

/// Errors produced while dispatching referrals.
///
/// Per-recipient variants end up as `failures` entries of a
/// [`BatchResult`](crate::batch::BatchResult); only `Structural` and
/// `Validation` are ever returned by the batch call itself.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ReferralError {
    /// Malformed input, such as a bad address or a duplicated recipient.
    #[error("{0}")]
    Validation(String),

    /// The request cannot be processed at all.
    #[error("{0}")]
    Structural(String),

    /// Business-rule rejection of a recipient.
    #[error("recipient is not eligible for a referral: {reason}")]
    Ineligible { reason: IneligibleReason },

    /// The eligibility lookup itself failed.
    #[error("eligibility check failed: {0}")]
    Lookup(String),

    /// The referral record could not be written.
    #[error("{message}")]
    Create { message: String, code: u16 },

    /// The invite email could not be sent.
    #[error("{message}")]
    Dispatch { message: String },

    /// The batch deadline expired before this recipient finished.
    #[error("timeout")]
    Timeout,

    /// The recipient's pipeline task panicked or was cancelled.
    #[error("recipient pipeline aborted")]
    Aborted,
}

impl ReferralError {
    /// HTTP-class status code for this error.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Structural(_) | Self::Ineligible { .. } => 400,
            Self::Lookup(_) | Self::Dispatch { .. } | Self::Aborted => 500,
            Self::Create { code, .. } => *code,
            Self::Timeout => 504,
        }
    }

    /// Wraps a failed store write, keeping its message and code.
    #[must_use]
    pub fn create(err: &StoreError) -> Self {
        Self::Create {
            message: err.to_string(),
            code: err.code(),
        }
    }
}

impl From<CoreError> for ReferralError {
    fn from(err: CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<TransportError> for ReferralError {
    fn from(err: TransportError) -> Self {
        Self::Dispatch {
            message: err.to_string(),
        }
    }
}
