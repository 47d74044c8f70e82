//! Static referral settings, read once when the service is assembled.

use std::time::Duration;

use bridge_core::{Credit, CoreError, ReferralChannel};
use serde::{Deserialize, Serialize};

/// What to do with a freshly created referral whose invite email failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DispatchFailurePolicy {
    /// Keep the record. The recipient is credited but never notified.
    Retain,
    /// Delete the record so the pair can be retried later.
    #[default]
    Rollback,
}

/// Configuration for referral dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ReferralConfig {
    /// Credit granted to both the sender and the recipient.
    pub credit_amount: f64,

    /// Channel recorded on referrals created by the batch dispatcher.
    pub channel: ReferralChannel,

    /// Prefix joined with a profile's referral link to form the invite URL.
    pub referral_url_base: String,

    /// Mailer template used for invite emails.
    pub mail_template: String,

    /// Upper bound on recipient pipelines running at once.
    pub max_concurrency: usize,

    /// Whole-batch deadline in milliseconds. `None` waits indefinitely.
    pub batch_timeout_ms: Option<u64>,

    /// Reconciliation when a record was created but the email failed or
    /// missed the batch deadline.
    pub on_dispatch_failure: DispatchFailurePolicy,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            credit_amount: 10.0,
            channel: ReferralChannel::Email,
            referral_url_base: "https://app.storj.io/signup?referralLink=".to_owned(),
            mail_template: "referral".to_owned(),
            max_concurrency: 16,
            batch_timeout_ms: None,
            on_dispatch_failure: DispatchFailurePolicy::default(),
        }
    }
}

impl ReferralConfig {
    /// The configured credit amount.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidCredit`] if `credit_amount` is negative or
    /// not finite.
    pub fn credit(&self) -> Result<Credit, CoreError> {
        Credit::new(self.credit_amount)
    }

    /// The batch deadline, if one is configured.
    #[must_use]
    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_ms.map(Duration::from_millis)
    }

    /// Concurrency limit, never below one.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_program_terms() {
        let config = ReferralConfig::default();
        assert!((config.credit_amount - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.channel, ReferralChannel::Email);
        assert_eq!(config.on_dispatch_failure, DispatchFailurePolicy::Rollback);
        assert!(config.batch_timeout().is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let raw = r#"{"batch_timeout_ms": 250, "on_dispatch_failure": "retain"}"#;
        let config: ReferralConfig = match serde_json::from_str(raw) {
            Ok(c) => c,
            Err(e) => panic!("config parse failed: {e}"),
        };
        assert_eq!(config.batch_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.on_dispatch_failure, DispatchFailurePolicy::Retain);
        assert_eq!(config.mail_template, "referral");
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let config = ReferralConfig {
            max_concurrency: 0,
            ..ReferralConfig::default()
        };
        assert_eq!(config.concurrency(), 1);
    }

    #[test]
    fn negative_credit_is_rejected() {
        let config = ReferralConfig {
            credit_amount: -5.0,
            ..ReferralConfig::default()
        };
        assert!(config.credit().is_err());
    }
}
