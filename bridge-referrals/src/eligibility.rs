//! Recipient eligibility checks.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_core::{Email, ReferralPair};

use crate::error::IneligibleReason;
use crate::store::DocumentStore;
use crate::ReferralError;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The recipient may be referred; carries the validated address.
    Eligible(Email),
    /// The recipient may not be referred by this sender.
    Ineligible(IneligibleReason),
}

/// Decides whether a sender may refer a candidate address.
#[async_trait]
pub trait EligibilityChecker: Send + Sync {
    /// Check `candidate` against `sender`.
    ///
    /// An ineligible candidate is `Ok(Eligibility::Ineligible(_))`, never an
    /// error.
    ///
    /// # Errors
    /// Returns [`ReferralError::Validation`] if `candidate` is malformed, or
    /// [`ReferralError::Lookup`] if a prior-referral lookup fails.
    async fn is_eligible(
        &self,
        sender: &Email,
        candidate: &str,
    ) -> Result<Eligibility, ReferralError>;
}

/// Eligibility backed by the referral history in a [`DocumentStore`].
pub struct StoreEligibility<S: ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> StoreEligibility<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: DocumentStore + ?Sized> EligibilityChecker for StoreEligibility<S> {
    async fn is_eligible(
        &self,
        sender: &Email,
        candidate: &str,
    ) -> Result<Eligibility, ReferralError> {
        let recipient = Email::parse(candidate)?;
        if recipient == *sender {
            return Ok(Eligibility::Ineligible(IneligibleReason::SelfReferral));
        }
        let pair = ReferralPair::new(sender, &recipient);
        match self.store.find_referral(&pair).await {
            Ok(Some(_)) => Ok(Eligibility::Ineligible(IneligibleReason::AlreadyReferred)),
            Ok(None) => Ok(Eligibility::Eligible(recipient)),
            Err(e) => Err(ReferralError::Lookup(e.to_string())),
        }
    }
}
