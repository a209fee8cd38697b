//! User preference record and its partial-update patch.

use serde::{Deserialize, Serialize};

use super::{Currency, ThemePreference};

/// The single mutable user preference record.
///
/// Stored as `{ "name", "initialBalance", "currency", "theme" }`. Every
/// field falls back to its default when absent from a stored document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    /// Display name; empty until onboarding is finished.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Baseline added to the ledger balance for display only.
    pub initial_balance: f64,
    /// Currency used for the display symbol.
    pub currency: Currency,
    /// Colour scheme preference.
    pub theme: ThemePreference,
}

impl UserPreferences {
    /// Returns `true` once a non-blank display name has been set.
    #[inline]
    #[must_use]
    pub fn onboarding_complete(&self) -> bool {
        !self.display_name.trim().is_empty()
    }

    /// Shallow-merges `patch` into this record; unset fields keep their
    /// current value.
    #[inline]
    pub fn merge(&mut self, patch: PreferencesPatch) {
        let PreferencesPatch {
            display_name,
            initial_balance,
            currency,
            theme,
        } = patch;
        if let Some(name) = display_name {
            self.display_name = name;
        }
        if let Some(balance) = initial_balance {
            self.initial_balance = balance;
        }
        if let Some(code) = currency {
            self.currency = code;
        }
        if let Some(scheme) = theme {
            self.theme = scheme;
        }
    }
}

/// Partial update for [`UserPreferences`].
///
/// Build one with the chained setters; fields left `None` are untouched
/// by [`UserPreferences::merge`].
///
/// ```
/// use fintrack_rs::models::{PreferencesPatch, ThemePreference};
///
/// let patch = PreferencesPatch::new()
///     .display_name("Alex")
///     .theme(ThemePreference::Dark);
/// assert!(!patch.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferencesPatch {
    /// New display name.
    pub display_name: Option<String>,
    /// New initial balance.
    pub initial_balance: Option<f64>,
    /// New currency.
    pub currency: Option<Currency>,
    /// New theme.
    pub theme: Option<ThemePreference>,
}

impl PreferencesPatch {
    /// Creates an empty patch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name.
    #[inline]
    #[must_use]
    pub fn display_name<T: Into<String>>(mut self, name: T) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the initial balance.
    #[inline]
    #[must_use]
    pub const fn initial_balance(mut self, balance: f64) -> Self {
        self.initial_balance = Some(balance);
        self
    }

    /// Sets the currency.
    #[inline]
    #[must_use]
    pub const fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Sets the theme.
    #[inline]
    #[must_use]
    pub const fn theme(mut self, theme: ThemePreference) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Returns `true` when no field is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.initial_balance.is_none()
            && self.currency.is_none()
            && self.theme.is_none()
    }
}
