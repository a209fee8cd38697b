//! Personal finance ledger with write-through persistence.
//!
//! The crate keeps two pieces of state: an append-only transaction ledger
//! whose totals are always re-derived from the transactions, and a small
//! user preference record. [`fin_track::FinTrack`] owns both, hydrates
//! them from a [`storage`] backend at startup and persists every change in
//! the background through [`write_through::WriteThrough`].
//!
//! Enable the `async` feature for the tokio-based API, `blocking` for the
//! thread-based one, and `storage-file` for the on-disk JSON backend.

pub mod analytics;
pub mod error;
pub mod fin_track;
pub mod history;
pub mod models;
pub mod storage;
pub mod store;
pub mod write_through;
