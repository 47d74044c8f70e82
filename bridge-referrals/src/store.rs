//! Document store abstraction and the in-memory implementation.
//!
//! The store owns marketing profiles, referrals and debits. Implementations
//! must be `Send + Sync`: every recipient pipeline of a batch shares one
//! store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bridge_core::{Debit, Email, MarketingProfile, Referral, ReferralId, ReferralPair};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::StoreError;

/// Persistence seam for the referral service.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether the underlying connection can serve requests.
    fn is_ready(&self) -> bool;

    /// Return the user's marketing profile, creating it on first access.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the store cannot be reached.
    async fn get_or_create_marketing(&self, user: &Email) -> Result<MarketingProfile, StoreError>;

    /// Look up the referral for a (sender, recipient) pair.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the lookup cannot be performed.
    async fn find_referral(&self, pair: &ReferralPair) -> Result<Option<Referral>, StoreError>;

    /// Persist a referral and credit the sender's profile in one step.
    ///
    /// Nothing is written if any part fails.
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] if the pair already has a referral.
    async fn insert_referral(&self, referral: Referral) -> Result<Referral, StoreError>;

    /// Remove a referral and take back the sender's credit for it.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no referral has this id.
    async fn delete_referral(&self, id: ReferralId) -> Result<(), StoreError>;

    /// All referrals sent by `sender`, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the store cannot be reached.
    async fn referrals_sent_by(&self, sender: &Email) -> Result<Vec<Referral>, StoreError>;

    /// Record a debit against a user.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the store cannot be reached.
    async fn insert_debit(&self, debit: Debit) -> Result<Debit, StoreError>;

    /// All debits for `user`, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the store cannot be reached.
    async fn debits_for(&self, user: &Email) -> Result<Vec<Debit>, StoreError>;
}

#[derive(Debug, Default)]
struct Documents {
    marketing: HashMap<String, MarketingProfile>,
    referrals: IndexMap<ReferralPair, Referral>,
    debits: Vec<Debit>,
}

/// Thread-safe in-memory document store.
#[derive(Debug)]
pub struct MemoryStore {
    documents: RwLock<Documents>,
    ready: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            documents: RwLock::default(),
            ready: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    /// Create an empty, ready store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the readiness flag reported by [`DocumentStore::is_ready`].
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Documents>, StoreError> {
        self.documents.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Documents>, StoreError> {
        self.documents.write().map_err(poisoned)
    }

    fn check_ready(&self) -> Result<(), StoreError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("connection not ready".to_owned()))
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("document lock poisoned".to_owned())
}

/// A short random token for new marketing profiles.
fn new_referral_link() -> String {
    let token = Uuid::new_v4().simple().to_string();
    token[..12].to_owned()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn get_or_create_marketing(&self, user: &Email) -> Result<MarketingProfile, StoreError> {
        self.check_ready()?;
        let mut docs = self.write()?;
        let profile = docs
            .marketing
            .entry(user.normalized().to_owned())
            .or_insert_with(|| {
                MarketingProfile::new(user.as_str(), Some(new_referral_link()))
            });
        Ok(profile.clone())
    }

    async fn find_referral(&self, pair: &ReferralPair) -> Result<Option<Referral>, StoreError> {
        self.check_ready()?;
        Ok(self.read()?.referrals.get(pair).cloned())
    }

    async fn insert_referral(&self, referral: Referral) -> Result<Referral, StoreError> {
        self.check_ready()?;
        let pair = referral.pair();
        let mut docs = self.write()?;
        if docs.referrals.contains_key(&pair) {
            return Err(StoreError::Conflict {
                model: "Referral",
                key: pair.to_string(),
            });
        }
        let sender = &referral.sender;
        docs.marketing
            .entry(pair.sender.clone())
            .or_insert_with(|| {
                MarketingProfile::new(sender.email.as_str(), sender.referral_link.clone())
            })
            .record_referral(sender.amount_to_credit.value());
        docs.referrals.insert(pair, referral.clone());
        Ok(referral)
    }

    async fn delete_referral(&self, id: ReferralId) -> Result<(), StoreError> {
        self.check_ready()?;
        let mut docs = self.write()?;
        let not_found = || StoreError::NotFound {
            model: "Referral",
            key: id.to_string(),
        };
        let Some(index) = docs.referrals.values().position(|r| r.id == id) else {
            return Err(not_found());
        };
        let Some((pair, referral)) = docs.referrals.shift_remove_index(index) else {
            return Err(not_found());
        };
        if let Some(profile) = docs.marketing.get_mut(&pair.sender) {
            profile.referrals_sent = profile.referrals_sent.saturating_sub(1);
            profile.credit_earned -= referral.sender.amount_to_credit.value();
        }
        Ok(())
    }

    async fn referrals_sent_by(&self, sender: &Email) -> Result<Vec<Referral>, StoreError> {
        self.check_ready()?;
        Ok(self
            .read()?
            .referrals
            .iter()
            .filter(|(pair, _)| pair.sender == sender.normalized())
            .map(|(_, referral)| referral.clone())
            .collect())
    }

    async fn insert_debit(&self, debit: Debit) -> Result<Debit, StoreError> {
        self.check_ready()?;
        self.write()?.debits.push(debit.clone());
        Ok(debit)
    }

    async fn debits_for(&self, user: &Email) -> Result<Vec<Debit>, StoreError> {
        self.check_ready()?;
        Ok(self
            .read()?
            .debits
            .iter()
            .filter(|d| d.user.eq_ignore_ascii_case(user.as_str()))
            .cloned()
            .collect())
    }
}
