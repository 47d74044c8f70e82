//! Referral batch dispatch for the storage-network bridge.
//!
//! A batch names one sender and many recipient addresses. Each recipient
//! runs through its own pipeline (eligibility, record creation, invite
//! email) and the batch reports which recipients succeeded and which failed.
//!
//! The three pipeline steps are traits ([`EligibilityChecker`],
//! [`ReferralRecordCreator`], [`EmailDispatcher`]) so the
//! [`BatchOrchestrator`] can be assembled from store-backed implementations
//! in production and scripted ones in tests.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod batch;
pub mod config;
pub mod creator;
pub mod dispatcher;
pub mod eligibility;
pub mod error;
pub mod mailer;
pub mod orchestrator;
pub mod store;

pub use batch::{BatchResult, RecipientFailure, SenderContext};
pub use config::{DispatchFailurePolicy, ReferralConfig};
pub use creator::{ReferralRecordCreator, StoreReferralCreator};
pub use dispatcher::{EmailDispatcher, MailerDispatcher};
pub use eligibility::{Eligibility, EligibilityChecker, StoreEligibility};
pub use error::{IneligibleReason, ReferralError, StoreError, TransportError};
pub use mailer::{LogTransport, MailTransport};
pub use orchestrator::BatchOrchestrator;
pub use store::{DocumentStore, MemoryStore};
