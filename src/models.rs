//! Data models for the ledger and user preferences.
//!
//! This module contains the transaction record, the ledger snapshot with
//! its derived totals, the preference record with its partial-update
//! patch, and the enumeration types for constrained values.

mod enums;
mod ids;
mod ledger_state;
mod preferences;
mod transaction;

pub use enums::{Currency, ThemePreference, TransactionKind};
pub use ids::TransactionId;
pub use ledger_state::LedgerState;
pub use preferences::{PreferencesPatch, UserPreferences};
pub use transaction::Transaction;
