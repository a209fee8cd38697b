//! Read-only reports over the ledger: income/expense shares, expense
//! breakdown by category and the monthly trend.
//!
//! Everything here is derived from a [`LedgerState`] snapshot; nothing is
//! stored.

use std::collections::HashMap;

use chrono::Datelike;

use crate::models::{LedgerState, Transaction, TransactionKind};

/// Income versus expense totals with their percentage shares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Sum of income amounts.
    pub total_income: f64,
    /// Sum of expense amounts.
    pub total_expense: f64,
    /// Income as a percentage of income plus expense.
    pub income_share: f64,
    /// Expense as a percentage of income plus expense.
    pub expense_share: f64,
}

impl Summary {
    /// Builds the summary from the ledger's stored totals.
    ///
    /// Both shares are zero when the ledger has no volume.
    #[inline]
    #[must_use]
    pub fn from_state(state: &LedgerState) -> Self {
        let total_income = state.total_income();
        let total_expense = state.total_expense();
        let volume = total_income + total_expense;
        let share = |part: f64| if volume > 0.0 { part / volume * 100.0 } else { 0.0 };
        Self {
            total_income,
            total_expense,
            income_share: share(total_income),
            expense_share: share(total_expense),
        }
    }
}

/// Total expense recorded under one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// Category name as recorded.
    pub category: String,
    /// Sum of expense amounts.
    pub amount: f64,
}

/// Income and expense of one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    /// Month as `YYYY-MM`.
    pub month: String,
    /// Sum of income amounts.
    pub income: f64,
    /// Sum of expense amounts.
    pub expense: f64,
}

impl MonthlyTotals {
    /// Income minus expense for the month.
    #[inline]
    #[must_use]
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Sums expenses per category, largest first (ties by name).
#[inline]
#[must_use]
pub fn expense_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
    {
        *sums.entry(tx.category.as_str()).or_default() += tx.amount;
    }
    let mut totals: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_owned(),
            amount,
        })
        .collect();
    totals.sort_unstable_by(|left, right| {
        right
            .amount
            .total_cmp(&left.amount)
            .then_with(|| left.category.cmp(&right.category))
    });
    totals
}

/// Sums income and expense per calendar month, oldest month first.
///
/// Transactions whose timestamp cannot be parsed are skipped with a
/// warning.
#[inline]
#[must_use]
pub fn monthly_trend(transactions: &[Transaction]) -> Vec<MonthlyTotals> {
    let mut months: HashMap<(i32, u32), (f64, f64)> = HashMap::new();
    for tx in transactions {
        let Some(at) = tx.occurred_at_parsed() else {
            tracing::warn!(id = %tx.id, date = %tx.occurred_at, "skipping transaction with unparseable date");
            continue;
        };
        let entry = months.entry((at.year(), at.month())).or_default();
        match tx.kind {
            TransactionKind::Income => entry.0 += tx.amount,
            TransactionKind::Expense => entry.1 += tx.amount,
        }
    }
    let mut keyed: Vec<((i32, u32), (f64, f64))> = months.into_iter().collect();
    keyed.sort_unstable_by_key(|&(key, _)| key);
    keyed
        .into_iter()
        .map(|((year, month), (income, expense))| MonthlyTotals {
            month: format!("{year:04}-{month:02}"),
            income,
            expense,
        })
        .collect()
}
