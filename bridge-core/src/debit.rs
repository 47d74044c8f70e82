use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::DebitId;

/// What a debit charges for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum DebitKind {
    Bandwidth,
    Storage,
    Adjustment,
}

/// A charge against a user's account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Debit {
    pub id: DebitId,
    /// Email identity of the charged user.
    pub user: String,
    /// Amount in account currency.
    pub amount: f64,
    /// Bytes transferred, for bandwidth debits.
    pub bandwidth: i64,
    /// Byte-hours stored, for storage debits.
    pub storage: i64,
    pub created: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: DebitKind,
}

impl Debit {
    /// Creates a debit dated now.
    pub fn new(user: impl Into<String>, amount: f64, kind: DebitKind) -> Self {
        Self {
            id: DebitId::new(),
            user: user.into(),
            amount,
            bandwidth: 0,
            storage: 0,
            created: Utc::now(),
            kind,
        }
    }
}
