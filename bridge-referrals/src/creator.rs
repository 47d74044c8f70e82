//! Referral record creation.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_core::{
    Credit, Email, MarketingProfile, Referral, ReferralChannel, ReferralRecipient, ReferralSender,
};

use crate::store::DocumentStore;
use crate::ReferralError;

/// Persists referral records.
#[async_trait]
pub trait ReferralRecordCreator: Send + Sync {
    /// Record that `marketing`'s owner referred `recipient`.
    ///
    /// # Errors
    /// Returns [`ReferralError::Create`] carrying the store's message and
    /// code when the write is rejected.
    async fn create_referral(
        &self,
        marketing: &MarketingProfile,
        recipient: &Email,
    ) -> Result<Referral, ReferralError>;

    /// Remove a record created by [`Self::create_referral`].
    ///
    /// # Errors
    /// Returns [`ReferralError::Create`] if the removal is rejected.
    async fn discard_referral(&self, referral: &Referral) -> Result<(), ReferralError>;
}

/// Creates referrals in a [`DocumentStore`] with fixed credit terms.
pub struct StoreReferralCreator<S: ?Sized> {
    store: Arc<S>,
    credit: Credit,
    channel: ReferralChannel,
}

impl<S: DocumentStore + ?Sized> StoreReferralCreator<S> {
    /// Grant `credit` to both sides of every referral created.
    #[must_use]
    pub fn new(store: Arc<S>, credit: Credit, channel: ReferralChannel) -> Self {
        Self {
            store,
            credit,
            channel,
        }
    }
}

#[async_trait]
impl<S: DocumentStore + ?Sized> ReferralRecordCreator for StoreReferralCreator<S> {
    async fn create_referral(
        &self,
        marketing: &MarketingProfile,
        recipient: &Email,
    ) -> Result<Referral, ReferralError> {
        let sender = Email::parse(&marketing.user)?;
        let referral = Referral::new(
            ReferralSender {
                email: sender,
                referral_link: marketing.referral_link.clone(),
                amount_to_credit: self.credit,
            },
            ReferralRecipient {
                email: recipient.clone(),
                amount_to_credit: self.credit,
            },
            self.channel,
        );
        match self.store.insert_referral(referral).await {
            Ok(created) => {
                tracing::debug!(
                    referral = %created.id,
                    pair = %created.pair(),
                    "referral recorded"
                );
                Ok(created)
            }
            Err(e) => {
                tracing::warn!(%recipient, error = %e, code = e.code(), "referral write rejected");
                Err(ReferralError::create(&e))
            }
        }
    }

    async fn discard_referral(&self, referral: &Referral) -> Result<(), ReferralError> {
        self.store
            .delete_referral(referral.id)
            .await
            .map_err(|e| ReferralError::create(&e))
    }
}

#[cfg(test)]
mod tests {
    use bridge_core::ReferralPair;

    use super::*;
    use crate::store::MemoryStore;

    fn email(s: &str) -> Email {
        match Email::parse(s) {
            Ok(e) => e,
            Err(e) => panic!("bad fixture address {s}: {e}"),
        }
    }

    fn creator(store: &Arc<MemoryStore>) -> StoreReferralCreator<MemoryStore> {
        let credit = match Credit::new(10.0) {
            Ok(c) => c,
            Err(e) => panic!("bad credit: {e}"),
        };
        StoreReferralCreator::new(Arc::clone(store), credit, ReferralChannel::Email)
    }

    #[tokio::test]
    async fn create_referral_uses_link_and_credit_terms() {
        let store = Arc::new(MemoryStore::new());
        let marketing = MarketingProfile::new("dylan@storj.io", Some("abc-123".to_owned()));
        let recipient = email("recipient@storj.io");
        let referral = match creator(&store).create_referral(&marketing, &recipient).await {
            Ok(r) => r,
            Err(e) => panic!("create failed: {e}"),
        };
        assert_eq!(referral.sender.email.as_str(), "dylan@storj.io");
        assert_eq!(referral.sender.referral_link.as_deref(), Some("abc-123"));
        let sender_credit = referral.sender.amount_to_credit.value();
        let recipient_credit = referral.recipient.amount_to_credit.value();
        assert!((sender_credit - 10.0).abs() < f64::EPSILON);
        assert!((recipient_credit - 10.0).abs() < f64::EPSILON);
        assert_eq!(referral.channel, ReferralChannel::Email);

        let pair = ReferralPair::new(&email("dylan@storj.io"), &email("recipient@storj.io"));
        assert!(
            matches!(store.find_referral(&pair).await, Ok(Some(_))),
            "record must be persisted"
        );
    }

    #[tokio::test]
    async fn create_referral_duplicate_surfaces_conflict_code() {
        let store = Arc::new(MemoryStore::new());
        let creator = creator(&store);
        let marketing = MarketingProfile::new("dylan@storj.io", None);
        let recipient = email("recipient@storj.io");
        let first = creator.create_referral(&marketing, &recipient).await;
        assert!(first.is_ok());
        let second = creator.create_referral(&marketing, &recipient).await;
        match second {
            Err(ReferralError::Create { code, .. }) => assert_eq!(code, 409),
            other => panic!("expected Create conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_referral_failure_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        store.set_ready(false);
        let marketing = MarketingProfile::new("dylan@storj.io", None);
        let recipient = email("recipient@storj.io");
        let result = creator(&store).create_referral(&marketing, &recipient).await;
        assert!(matches!(
            result,
            Err(ReferralError::Create { code: 503, .. })
        ));

        store.set_ready(true);
        let sent = store
            .referrals_sent_by(&email("dylan@storj.io"))
            .await
            .unwrap_or_default();
        assert!(sent.is_empty(), "a rejected write must leave no record");
    }

    #[tokio::test]
    async fn discard_referral_removes_record() {
        let store = Arc::new(MemoryStore::new());
        let creator = creator(&store);
        let marketing = MarketingProfile::new("dylan@storj.io", None);
        let recipient = email("recipient@storj.io");
        let referral = match creator.create_referral(&marketing, &recipient).await {
            Ok(r) => r,
            Err(e) => panic!("create failed: {e}"),
        };
        assert!(creator.discard_referral(&referral).await.is_ok());
        let found = store.find_referral(&referral.pair()).await;
        assert!(matches!(found, Ok(None)));
    }
}
