use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::email::Email;
use crate::error::CoreError;
use crate::id::ReferralId;

/// Channel through which a referral was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ReferralChannel {
    /// Invite email sent by the bridge.
    Email,
    /// Link shared by the user directly.
    Link,
}

impl fmt::Display for ReferralChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Link => f.write_str("link"),
        }
    }
}

/// A credit amount granted to one side of a referral.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Credit(f64);

impl Credit {
    /// Creates a credit amount.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidCredit`] for negative, NaN or infinite values.
    pub fn new(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::InvalidCredit { value });
        }
        Ok(Self(value))
    }

    /// Returns the inner amount.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Credit {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Credit> for f64 {
    fn from(credit: Credit) -> Self {
        credit.0
    }
}

/// The referring side of a referral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSender {
    pub email: Email,
    pub referral_link: Option<String>,
    pub amount_to_credit: Credit,
}

/// The invited side of a referral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecipient {
    pub email: Email,
    pub amount_to_credit: Credit,
}

/// One sender-to-recipient referral.
///
/// Immutable once persisted; the (sender, recipient) pair is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Referral {
    pub id: ReferralId,
    pub sender: ReferralSender,
    pub recipient: ReferralRecipient,
    #[serde(rename = "type")]
    pub channel: ReferralChannel,
    pub created: DateTime<Utc>,
}

impl Referral {
    /// Builds a new, not yet persisted referral.
    #[must_use]
    pub fn new(
        sender: ReferralSender,
        recipient: ReferralRecipient,
        channel: ReferralChannel,
    ) -> Self {
        Self {
            id: ReferralId::new(),
            sender,
            recipient,
            channel,
            created: Utc::now(),
        }
    }

    /// The uniqueness key of this referral.
    #[must_use]
    pub fn pair(&self) -> ReferralPair {
        ReferralPair::new(&self.sender.email, &self.recipient.email)
    }
}

/// Normalised (sender, recipient) key identifying a referral.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferralPair {
    pub sender: String,
    pub recipient: String,
}

impl ReferralPair {
    /// Builds the key from two addresses.
    #[must_use]
    pub fn new(sender: &Email, recipient: &Email) -> Self {
        Self {
            sender: sender.normalized().to_owned(),
            recipient: recipient.normalized().to_owned(),
        }
    }
}

impl fmt::Display for ReferralPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.sender, self.recipient)
    }
}
