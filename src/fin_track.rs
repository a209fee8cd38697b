//! Application root: both stores, their shared write-through and the
//! selectors and commands the front end uses.
//!
//! # Example
//!
//! ```rust
//! use fintrack_rs::fin_track::FinTrack;
//! use fintrack_rs::models::{PreferencesPatch, Transaction, TransactionId, TransactionKind};
//! use fintrack_rs::write_through::WriteThrough;
//!
//! let mut app = FinTrack::new(WriteThrough::detached());
//! app.set_preferences(PreferencesPatch::new().display_name("Alex").initial_balance(100.0));
//! app.append_transaction(Transaction::new(
//!     TransactionId::from("1"),
//!     TransactionKind::Expense,
//!     40.0,
//!     "food",
//!     "2024-03-01T12:00:00Z",
//! ));
//! assert!((app.display_balance() - 60.0).abs() < f64::EPSILON);
//! ```

#[cfg(any(feature = "async", feature = "blocking"))]
use serde::de::DeserializeOwned;
#[cfg(any(feature = "async", feature = "blocking"))]
use serde_json::Value;

use crate::analytics::{self, CategoryTotal, MonthlyTotals, Summary};
use crate::error::{FinTrackError, Result};
use crate::history::{self, DayGroup, HistoryFilter};
use crate::models::{
    LedgerState, PreferencesPatch, Transaction, TransactionKind, UserPreferences,
};
#[cfg(any(feature = "async", feature = "blocking"))]
use crate::storage::keys;
#[cfg(feature = "blocking")]
use crate::storage::BlockingStorage;
#[cfg(feature = "async")]
use crate::storage::Storage;
use crate::store::{LedgerStore, PreferenceStore};
use crate::write_through::WriteThrough;

/// Explicit state container owned by the application root.
///
/// Reads go through the selectors ([`Self::ledger`], [`Self::preferences`]
/// and the derived views), writes through the typed commands. Every
/// command persists the affected store in the background.
#[derive(Debug)]
pub struct FinTrack {
    /// Transaction log and totals.
    ledger: LedgerStore,
    /// User preference record.
    preferences: PreferenceStore,
    /// Shared write-through handle, kept for [`Self::flush`].
    writer: WriteThrough,
}

impl FinTrack {
    /// Creates an application with default state and no hydration.
    #[inline]
    #[must_use]
    pub fn new(writer: WriteThrough) -> Self {
        Self {
            ledger: LedgerStore::new(writer.clone()),
            preferences: PreferenceStore::new(writer.clone()),
            writer,
        }
    }

    /// Loads both stores concurrently from `storage`, then starts the
    /// background writer on the current tokio runtime.
    ///
    /// A key that is missing, unreadable or undecodable leaves its store at
    /// the defaults; the failure is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`FinTrackError::WriterUnavailable`] when no tokio runtime is
    /// running.
    #[cfg(feature = "async")]
    #[tracing::instrument(skip_all)]
    pub async fn hydrate<S: Storage + 'static>(storage: S) -> Result<Self> {
        let (preferences, ledger) = tokio::join!(
            storage.load(keys::USER_PREFERENCES),
            storage.load(keys::TRANSACTIONS),
        );
        let mut app = Self::new(WriteThrough::spawn(storage)?);
        app.apply_snapshots(
            decode(keys::USER_PREFERENCES, preferences),
            decode(keys::TRANSACTIONS, ledger),
        );
        Ok(app)
    }

    /// Blocking counterpart of [`Self::hydrate`]; the writer runs on a
    /// dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns [`FinTrackError::WriterUnavailable`] if the writer thread
    /// cannot be spawned.
    #[cfg(feature = "blocking")]
    #[tracing::instrument(skip_all)]
    pub fn hydrate_blocking<S: BlockingStorage + 'static>(storage: S) -> Result<Self> {
        let preferences = storage.load(keys::USER_PREFERENCES);
        let ledger = storage.load(keys::TRANSACTIONS);
        let mut app = Self::new(WriteThrough::spawn_thread(storage)?);
        app.apply_snapshots(
            decode(keys::USER_PREFERENCES, preferences),
            decode(keys::TRANSACTIONS, ledger),
        );
        Ok(app)
    }

    /// Hands decoded snapshots to the stores.
    fn apply_snapshots(
        &mut self,
        preferences: Option<UserPreferences>,
        ledger: Option<LedgerState>,
    ) {
        self.preferences.hydrate(preferences);
        self.ledger.hydrate(ledger);
        tracing::info!(
            transactions = self.ledger.state().len(),
            onboarded = self.onboarding_complete(),
            "state hydrated"
        );
    }

    // ── Selectors ───────────────────────────────────────────────────

    /// Returns the ledger snapshot.
    #[inline]
    #[must_use]
    pub const fn ledger(&self) -> &LedgerState {
        self.ledger.state()
    }

    /// Returns the preference record.
    #[inline]
    #[must_use]
    pub const fn preferences(&self) -> &UserPreferences {
        self.preferences.preferences()
    }

    /// Returns the ledger store for custom projections.
    #[inline]
    #[must_use]
    pub const fn ledger_store(&self) -> &LedgerStore {
        &self.ledger
    }

    /// Returns the preference store for custom projections.
    #[inline]
    #[must_use]
    pub const fn preference_store(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Balance shown to the user: initial balance plus ledger balance.
    #[inline]
    #[must_use]
    pub fn display_balance(&self) -> f64 {
        self.preferences().initial_balance + self.ledger().total_balance()
    }

    /// Returns `true` once the user has finished onboarding.
    #[inline]
    #[must_use]
    pub fn onboarding_complete(&self) -> bool {
        self.preferences.onboarding_complete()
    }

    /// Most recent transactions, newest first.
    #[inline]
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &Transaction> {
        self.ledger().recent(limit)
    }

    /// Transactions matching `filter`, grouped by day, newest day first.
    #[inline]
    #[must_use]
    pub fn history(&self, filter: &HistoryFilter) -> Vec<DayGroup<'_>> {
        history::group_by_day(self.ledger().transactions(), filter)
    }

    /// Income versus expense shares.
    #[inline]
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::from_state(self.ledger())
    }

    /// Expense totals per category, largest first.
    #[inline]
    #[must_use]
    pub fn expense_by_category(&self) -> Vec<CategoryTotal> {
        analytics::expense_by_category(self.ledger().transactions())
    }

    /// Income and expense per month, oldest first.
    #[inline]
    #[must_use]
    pub fn monthly_trend(&self) -> Vec<MonthlyTotals> {
        analytics::monthly_trend(self.ledger().transactions())
    }

    /// Checks a new entry before it is appended.
    ///
    /// Amounts must be finite and positive. Expenses may not exceed
    /// [`Self::display_balance`]. The category must not be blank. The
    /// ledger itself accepts any amount; only the front end enforces this.
    ///
    /// # Errors
    ///
    /// Returns [`FinTrackError::InvalidValue`] describing the first failed
    /// check.
    #[inline]
    pub fn validate_entry(&self, kind: TransactionKind, amount: f64, category: &str) -> Result<()> {
        if !amount.is_finite() {
            return Err(FinTrackError::InvalidValue(
                "please enter a valid number".to_owned(),
            ));
        }
        if amount <= 0.0 {
            return Err(FinTrackError::InvalidValue(
                "amount must be greater than 0".to_owned(),
            ));
        }
        if kind == TransactionKind::Expense && amount > self.display_balance() {
            return Err(FinTrackError::InvalidValue(
                "amount cannot be greater than your balance".to_owned(),
            ));
        }
        if category.trim().is_empty() {
            return Err(FinTrackError::InvalidValue(
                "please select a category".to_owned(),
            ));
        }
        Ok(())
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Appends a transaction to the ledger.
    #[inline]
    pub fn append_transaction(&mut self, transaction: Transaction) {
        self.ledger.append(transaction);
    }

    /// Removes every transaction.
    #[inline]
    pub fn reset_transactions(&mut self) {
        self.ledger.reset_all();
    }

    /// Shallow-merges a preference patch.
    #[inline]
    pub fn set_preferences(&mut self, patch: PreferencesPatch) {
        self.preferences.set_preferences(patch);
    }

    /// Restores the default preferences.
    #[inline]
    pub fn reset_preferences(&mut self) {
        self.preferences.reset();
    }

    /// Returns both stores to first-launch state and clears both keys.
    #[inline]
    pub fn factory_reset(&mut self) {
        tracing::info!("factory reset");
        self.ledger.clear();
        self.preferences.clear();
    }

    /// Waits for every write issued so far.
    #[inline]
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Blocking counterpart of [`Self::flush`].
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    #[inline]
    pub fn flush_blocking(&self) {
        self.writer.flush_blocking();
    }
}

/// Turns a load result into a snapshot, logging why it is unusable.
#[cfg(any(feature = "async", feature = "blocking"))]
fn decode<T: DeserializeOwned>(key: &str, loaded: Result<Option<Value>>) -> Option<T> {
    match loaded {
        Ok(Some(document)) => match serde_json::from_value(document) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "persisted document has wrong shape, using defaults");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "failed to load persisted state, using defaults");
            None
        }
    }
}
