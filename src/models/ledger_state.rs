//! Ledger snapshot: the transaction log plus its derived totals.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::transaction::nullable_f64;
use super::{Transaction, TransactionKind};

/// Largest absolute difference tolerated between a stored aggregate and
/// its re-derived value before the stored one is considered corrupt.
const AGGREGATE_TOLERANCE: f64 = 1e-6;

/// Ordered transaction log with derived aggregates.
///
/// The three totals are private and only ever written by a full re-fold
/// over `transactions`, so they cannot be set independently. Serialized
/// as a single JSON document:
///
/// ```json
/// { "transactions": [...], "totalBalance": 0, "totalIncome": 0, "totalExpense": 0 }
/// ```
///
/// Missing fields deserialize to empty/zero and a `null` total reads as
/// NaN. A stored entry that is not a valid transaction is dropped with a
/// warning while the rest of the log is kept.
/// [`crate::store::LedgerStore`] re-derives the totals on hydration when
/// they do not match the list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    /// Transactions in append order.
    #[serde(default, deserialize_with = "skip_invalid_transactions")]
    transactions: Vec<Transaction>,
    /// `total_income - total_expense`.
    #[serde(default, deserialize_with = "nullable_f64")]
    total_balance: f64,
    /// Sum of income amounts.
    #[serde(default, deserialize_with = "nullable_f64")]
    total_income: f64,
    /// Sum of expense amounts.
    #[serde(default, deserialize_with = "nullable_f64")]
    total_expense: f64,
}

/// Income and expense sums produced by one fold.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Totals {
    /// Sum of income amounts.
    income: f64,
    /// Sum of expense amounts.
    expense: f64,
}

impl Totals {
    /// Folds every transaction into income/expense sums.
    fn fold(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Self::default(), |mut acc, tx| {
                match tx.kind {
                    TransactionKind::Income => acc.income += tx.amount,
                    TransactionKind::Expense => acc.expense += tx.amount,
                }
                acc
            })
    }
}

impl LedgerState {
    /// Creates an empty ledger with all totals at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from a transaction list, deriving the totals.
    #[inline]
    #[must_use]
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut state = Self {
            transactions,
            ..Self::default()
        };
        state.recompute();
        state
    }

    /// Returns the transactions in append order.
    #[inline]
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Returns the ledger balance (income minus expense).
    #[inline]
    #[must_use]
    pub const fn total_balance(&self) -> f64 {
        self.total_balance
    }

    /// Returns the sum of all income amounts.
    #[inline]
    #[must_use]
    pub const fn total_income(&self) -> f64 {
        self.total_income
    }

    /// Returns the sum of all expense amounts.
    #[inline]
    #[must_use]
    pub const fn total_expense(&self) -> f64 {
        self.total_expense
    }

    /// Returns the number of recorded transactions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Returns `true` when no transaction has been recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Iterates over the most recently appended transactions, newest first.
    #[inline]
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().rev().take(limit)
    }

    /// Returns `true` when the stored totals agree with a re-fold of the
    /// transaction list.
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let totals = Totals::fold(&self.transactions);
        approx_eq(self.total_income, totals.income)
            && approx_eq(self.total_expense, totals.expense)
            && approx_eq(self.total_balance, totals.income - totals.expense)
    }

    /// Appends a transaction and re-derives every total.
    pub(crate) fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
        self.recompute();
    }

    /// Re-derives all three totals by a full fold over the list.
    pub(crate) fn recompute(&mut self) {
        let totals = Totals::fold(&self.transactions);
        self.total_income = totals.income;
        self.total_expense = totals.expense;
        self.total_balance = totals.income - totals.expense;
    }
}

/// Compares two aggregates within [`AGGREGATE_TOLERANCE`]. Two NaNs
/// compare equal, as do equal infinities.
fn approx_eq(left: f64, right: f64) -> bool {
    left.total_cmp(&right).is_eq()
        || (left.is_nan() && right.is_nan())
        || (left - right).abs() <= AGGREGATE_TOLERANCE
}

/// Decodes the stored log entry by entry, dropping undecodable ones.
fn skip_invalid_transactions<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Transaction>, D::Error> {
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(transaction) => Some(transaction),
            Err(err) => {
                tracing::warn!(index, error = %err, "dropping unreadable stored transaction");
                None
            }
        })
        .collect())
}
