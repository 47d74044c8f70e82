//! Core types for the storage-network bridge referral service.
//!
//! Defines the persisted documents (marketing profiles, referrals, debits)
//! and the validated value types they are built from.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod debit;
pub mod email;
pub mod error;
pub mod id;
pub mod marketing;
pub mod referral;

pub use debit::{Debit, DebitKind};
pub use email::Email;
pub use error::CoreError;
pub use id::{DebitId, MarketingId, ReferralId};
pub use marketing::MarketingProfile;
pub use referral::{
    Credit, Referral, ReferralChannel, ReferralPair, ReferralRecipient, ReferralSender,
};
