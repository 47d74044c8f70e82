use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::MarketingId;

/// A user's participation in the referral program.
///
/// One profile exists per user. Profiles are never deleted by the referral
/// subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct MarketingProfile {
    /// Document identifier.
    #[serde(default)]
    pub id: MarketingId,
    /// Email identity of the owning user.
    pub user: String,
    /// Token appended to the invite URL. Older profiles may not have one.
    #[serde(default)]
    pub referral_link: Option<String>,
    /// When the profile was created.
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    /// Number of referral records created by this user.
    #[serde(default)]
    pub referrals_sent: u64,
    /// Total credit granted to this user through referrals.
    #[serde(default)]
    pub credit_earned: f64,
}

impl MarketingProfile {
    /// Creates a fresh profile with zeroed counters.
    pub fn new(user: impl Into<String>, referral_link: Option<String>) -> Self {
        Self {
            id: MarketingId::new(),
            user: user.into(),
            referral_link,
            created: Utc::now(),
            referrals_sent: 0,
            credit_earned: 0.0,
        }
    }

    /// Applies the counters for one newly recorded referral.
    pub fn record_referral(&mut self, credit: f64) {
        self.referrals_sent += 1;
        self.credit_earned += credit;
    }
}
