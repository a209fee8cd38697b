//! Transaction model.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use super::{TransactionId, TransactionKind};

/// A single income or expense record.
///
/// Transactions are immutable once created. The amount is expected to be
/// positive but the ledger does not enforce it; validation belongs to
/// whoever builds the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-supplied identifier.
    pub id: TransactionId,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Currency-agnostic amount. Non-finite amounts are stored as `null`
    /// and read back as NaN.
    #[serde(deserialize_with = "nullable_f64")]
    pub amount: f64,
    /// Free-form category label.
    pub category: String,
    /// Optional free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When the transaction happened (RFC 3339), as supplied by the caller.
    #[serde(rename = "date")]
    pub occurred_at: String,
}

impl Transaction {
    /// Creates a transaction without a note.
    #[inline]
    #[must_use]
    pub fn new<C: Into<String>, T: Into<String>>(
        id: TransactionId,
        kind: TransactionKind,
        amount: f64,
        category: C,
        occurred_at: T,
    ) -> Self {
        Self {
            id,
            kind,
            amount,
            category: category.into(),
            note: None,
            occurred_at: occurred_at.into(),
        }
    }

    /// Attaches a note. Blank notes are dropped.
    #[inline]
    #[must_use]
    pub fn with_note<N: Into<String>>(mut self, note: N) -> Self {
        let text: String = note.into();
        let trimmed = text.trim();
        self.note = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Returns the contribution of this transaction to the balance:
    /// `+amount` for income, `-amount` for expense.
    #[inline]
    #[must_use]
    pub const fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Parses [`Self::occurred_at`] as an RFC 3339 timestamp.
    ///
    /// Returns `None` when the stored text is not a valid timestamp; the
    /// ledger keeps such records, only date-based views skip them.
    #[inline]
    #[must_use]
    pub fn occurred_at_parsed(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.occurred_at).ok()
    }
}

/// Reads a number that may have been written as `null`.
///
/// `serde_json` writes NaN and infinities as `null`; they come back as NaN.
pub(super) fn nullable_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
