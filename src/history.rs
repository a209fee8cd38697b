//! Transaction history: filtering and grouping by calendar day.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{Transaction, TransactionKind};

/// Filter criteria for [`group_by_day`].
///
/// All criteria are optional. When multiple criteria are set, they are
/// combined with AND logic.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Only this kind of transaction.
    pub kind: Option<TransactionKind>,
    /// Start date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// End date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Category name (case-insensitive exact match).
    pub category: Option<String>,
}

impl HistoryFilter {
    /// Creates an empty filter that matches all transactions.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one transaction kind.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to transactions within the given date range (inclusive).
    #[inline]
    #[must_use]
    pub const fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Restricts to transactions on or after `from`.
    #[inline]
    #[must_use]
    pub const fn date_from(mut self, from: NaiveDate) -> Self {
        self.date_from = Some(from);
        self
    }

    /// Restricts to transactions on or before `to`.
    #[inline]
    #[must_use]
    pub const fn date_to(mut self, to: NaiveDate) -> Self {
        self.date_to = Some(to);
        self
    }

    /// Restricts to one category.
    #[inline]
    #[must_use]
    pub fn category<T: Into<String>>(mut self, name: T) -> Self {
        self.category = Some(name.into());
        self
    }

    /// Returns `true` if the transaction, dated `day`, satisfies all set
    /// criteria.
    fn matches(&self, tx: &Transaction, day: NaiveDate) -> bool {
        self.kind.is_none_or(|kind| tx.kind == kind)
            && self.date_from.is_none_or(|from| day >= from)
            && self.date_to.is_none_or(|to| day <= to)
            && self
                .category
                .as_ref()
                .is_none_or(|name| tx.category.eq_ignore_ascii_case(name))
    }
}

/// Transactions recorded on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'tx> {
    /// Day in the timestamp's own offset.
    pub day: NaiveDate,
    /// Matching transactions of that day, in append order.
    pub transactions: Vec<&'tx Transaction>,
}

impl DayGroup<'_> {
    /// Net change of the day: income minus expense.
    #[inline]
    #[must_use]
    pub fn net(&self) -> f64 {
        self.transactions.iter().map(|tx| tx.signed_amount()).sum()
    }
}

/// Groups matching transactions by day, newest day first.
///
/// Transactions whose timestamp cannot be parsed are skipped with a
/// warning. Days without a matching transaction are omitted.
#[inline]
#[must_use]
pub fn group_by_day<'tx>(
    transactions: &'tx [Transaction],
    filter: &HistoryFilter,
) -> Vec<DayGroup<'tx>> {
    let mut days: HashMap<NaiveDate, Vec<&'tx Transaction>> = HashMap::new();
    for tx in transactions {
        let Some(at) = tx.occurred_at_parsed() else {
            tracing::warn!(id = %tx.id, date = %tx.occurred_at, "skipping transaction with unparseable date");
            continue;
        };
        let day = at.date_naive();
        if filter.matches(tx, day) {
            days.entry(day).or_default().push(tx);
        }
    }
    let mut groups: Vec<DayGroup<'tx>> = days
        .into_iter()
        .map(|(day, txs)| DayGroup {
            day,
            transactions: txs,
        })
        .collect();
    groups.sort_unstable_by(|left, right| right.day.cmp(&left.day));
    groups
}
