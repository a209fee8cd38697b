//! In-memory stores for the ledger and the user preferences.
//!
//! Each store exclusively owns its record, mutates it through typed
//! commands and writes the new snapshot through after every mutation.
//! Consumers combine values from both stores themselves (see
//! [`crate::fin_track::FinTrack::display_balance`]).

mod ledger;
mod preferences;

pub use ledger::LedgerStore;
pub use preferences::PreferenceStore;
