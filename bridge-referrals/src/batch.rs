//! Batch request and result types.

use bridge_core::{Email, MarketingProfile};
use serde::{Deserialize, Serialize};

use crate::ReferralError;

/// The authenticated sender of a referral batch.
#[derive(Debug, Clone)]
pub struct SenderContext {
    pub marketing: MarketingProfile,
    pub email: Email,
}

impl SenderContext {
    /// Build a sender context from the sender's marketing profile.
    ///
    /// # Errors
    /// Returns [`ReferralError::Structural`] if the profile has no user, or
    /// [`ReferralError::Validation`] if the user is not a valid address.
    pub fn new(marketing: MarketingProfile) -> Result<Self, ReferralError> {
        if marketing.user.trim().is_empty() {
            return Err(ReferralError::Structural(
                "sender is not authenticated".to_owned(),
            ));
        }
        let email = Email::parse(&marketing.user)?;
        Ok(Self { marketing, email })
    }
}

/// One recipient that did not complete the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFailure {
    pub email: String,
    pub message: String,
    pub code: u16,
}

impl RecipientFailure {
    #[must_use]
    pub fn new(email: impl Into<String>, err: &ReferralError) -> Self {
        Self {
            email: email.into(),
            message: err.to_string(),
            code: err.code(),
        }
    }
}

/// Aggregated outcome of a referral batch.
///
/// Every submitted recipient appears exactly once, in either `successes` or
/// `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub successes: Vec<String>,
    pub failures: Vec<RecipientFailure>,
}

impl BatchResult {
    /// Number of recipients accounted for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the failure recorded for `email`, if any.
    #[must_use]
    pub fn failure_for(&self, email: &str) -> Option<&RecipientFailure> {
        self.failures.iter().find(|f| f.email == email)
    }
}
