//! Ledger store: append-only transaction log with derived totals.

use crate::models::{LedgerState, Transaction};
use crate::storage::keys;
use crate::write_through::WriteThrough;

/// Owner of the [`LedgerState`].
///
/// Totals are re-derived by a full fold on every mutation, and every
/// mutation writes the whole state through under
/// [`keys::TRANSACTIONS`].
#[derive(Debug)]
pub struct LedgerStore {
    /// Current snapshot.
    state: LedgerState,
    /// Write-through hook.
    writer: WriteThrough,
}

impl LedgerStore {
    /// Creates an empty ledger wired to `writer`.
    #[inline]
    #[must_use]
    pub fn new(writer: WriteThrough) -> Self {
        Self {
            state: LedgerState::new(),
            writer,
        }
    }

    /// Replaces the in-memory state with a persisted snapshot.
    ///
    /// `None` keeps the empty ledger. A snapshot whose totals disagree with
    /// its transaction list has them re-derived. Nothing is written back.
    #[inline]
    pub fn hydrate(&mut self, snapshot: Option<LedgerState>) {
        let Some(mut state) = snapshot else {
            tracing::debug!("no persisted ledger, starting empty");
            return;
        };
        if !state.is_consistent() {
            tracing::warn!(
                transactions = state.len(),
                "persisted ledger totals are inconsistent, re-deriving"
            );
            state.recompute();
        }
        tracing::debug!(transactions = state.len(), "ledger hydrated");
        self.state = state;
    }

    /// Appends a transaction, re-derives the totals and persists the state.
    #[inline]
    pub fn append(&mut self, transaction: Transaction) {
        tracing::debug!(id = %transaction.id, kind = %transaction.kind, "appending transaction");
        self.state.push(transaction);
        self.writer.persist(keys::TRANSACTIONS, Some(&self.state));
    }

    /// Drops every transaction and zeroes the totals, then persists the
    /// empty state.
    #[inline]
    pub fn reset_all(&mut self) {
        tracing::debug!(dropped = self.state.len(), "resetting ledger");
        self.state = LedgerState::new();
        self.writer.persist(keys::TRANSACTIONS, Some(&self.state));
    }

    /// Resets in memory and clears the persisted key.
    pub(crate) fn clear(&mut self) {
        self.state = LedgerState::new();
        self.writer.persist::<LedgerState>(keys::TRANSACTIONS, None);
    }

    /// Returns the current snapshot.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Projects a value out of the current snapshot.
    #[inline]
    pub fn select<R, F: FnOnce(&LedgerState) -> R>(&self, selector: F) -> R {
        selector(&self.state)
    }
}
