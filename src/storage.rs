//! Pluggable key-value storage backends for persisting ledger and
//! preference snapshots.
//!
//! This module defines the [`Storage`] (async) and [`BlockingStorage`]
//! (blocking) traits via a shared macro. Each key holds one JSON document;
//! saving `None` clears the key.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::error::{FinTrackError, Result};

/// Well-known storage keys.
pub mod keys {
    /// Key of the user preference document.
    pub const USER_PREFERENCES: &str = "user_preferences";
    /// Key of the ledger document (transactions plus totals).
    pub const TRANSACTIONS: &str = "transactions";
}

/// Checks that a key only uses characters every backend can persist
/// (ASCII alphanumerics, `_` and `-`).
///
/// # Errors
///
/// Returns [`FinTrackError::InvalidKey`] for empty keys or keys with any
/// other character.
#[inline]
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-');
    if valid {
        Ok(())
    } else {
        Err(FinTrackError::InvalidKey(key.to_owned()))
    }
}

/// Generates a storage trait (async or blocking) with all gateway methods.
///
/// Uses `@methods` to define the method list once, and `@method` to render
/// each method in async (`impl Future + Send`) or blocking (`fn`) style.
macro_rules! define_storage {
    // ── Entry points ────────────────────────────────────────────────
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods blocking);
        }
    };

    // ── Single method list (shared between both variants) ───────────
    (@methods $mode:ident) => {
        define_storage!(@method $mode, load,
            "Loads the JSON document stored under `key`.\n\nReturns `Ok(None)` if the key was never written, was cleared, or holds\na document that cannot be parsed.\n\n# Errors\n\nReturns an error if the key is invalid or the backend fails to read.",
            key: &str, -> Result<Option<Value>>);
        define_storage!(@method $mode, save,
            "Stores `value` under `key`, replacing any previous document.\n\nPassing `None` clears the key.\n\n# Errors\n\nReturns an error if the key is invalid or the backend fails to write.",
            key: &str, value: Option<Value>, -> Result<()>);
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_storage {
    //! Async storage trait definition.

    use serde_json::Value;

    use crate::error::Result;

    define_storage! {
        trait_name: Storage,
        trait_doc: "Async key-value backend for persisted snapshots.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_storage {
    //! Blocking storage trait definition.

    use serde_json::Value;

    use crate::error::Result;

    define_storage! {
        trait_name: BlockingStorage,
        trait_doc: "Blocking key-value backend for persisted snapshots.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_storage::Storage;
#[cfg(feature = "blocking")]
pub use blocking_storage::BlockingStorage;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_keys_are_valid() {
        assert!(validate_key(keys::USER_PREFERENCES).is_ok());
        assert!(validate_key(keys::TRANSACTIONS).is_ok());
        assert!(validate_key("cache-v2").is_ok());
    }

    #[test]
    fn rejects_path_like_and_empty_keys() {
        for key in ["", "../prefs", "a/b", "with space", "@transactions", "k\u{e9}y"] {
            let err = validate_key(key).unwrap_err();
            assert!(matches!(err, FinTrackError::InvalidKey(_)), "{key}");
        }
    }
}
