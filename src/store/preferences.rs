//! Preference store: the single user preference record.

use crate::models::{PreferencesPatch, UserPreferences};
use crate::storage::keys;
use crate::write_through::WriteThrough;

/// Owner of the [`UserPreferences`] record.
///
/// Every mutation writes the full merged record through under
/// [`keys::USER_PREFERENCES`].
#[derive(Debug)]
pub struct PreferenceStore {
    /// Current record.
    preferences: UserPreferences,
    /// Write-through hook.
    writer: WriteThrough,
}

impl PreferenceStore {
    /// Creates a store holding the default preferences.
    #[inline]
    #[must_use]
    pub fn new(writer: WriteThrough) -> Self {
        Self {
            preferences: UserPreferences::default(),
            writer,
        }
    }

    /// Replaces the in-memory record with a persisted one.
    ///
    /// `None` keeps the defaults. Nothing is written back.
    #[inline]
    pub fn hydrate(&mut self, snapshot: Option<UserPreferences>) {
        match snapshot {
            Some(preferences) => {
                tracing::debug!(
                    onboarded = preferences.onboarding_complete(),
                    "preferences hydrated"
                );
                self.preferences = preferences;
            }
            None => tracing::debug!("no persisted preferences, using defaults"),
        }
    }

    /// Shallow-merges `patch` and persists the merged record.
    ///
    /// An empty patch changes nothing and writes the unchanged record.
    #[inline]
    pub fn set_preferences(&mut self, patch: PreferencesPatch) {
        self.preferences.merge(patch);
        self.writer
            .persist(keys::USER_PREFERENCES, Some(&self.preferences));
    }

    /// Restores the defaults and persists them.
    #[inline]
    pub fn reset(&mut self) {
        self.preferences = UserPreferences::default();
        self.writer
            .persist(keys::USER_PREFERENCES, Some(&self.preferences));
    }

    /// Restores the defaults in memory and clears the persisted key.
    pub(crate) fn clear(&mut self) {
        self.preferences = UserPreferences::default();
        self.writer
            .persist::<UserPreferences>(keys::USER_PREFERENCES, None);
    }

    /// Returns the current record.
    #[inline]
    #[must_use]
    pub const fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    /// Projects a value out of the current record.
    #[inline]
    pub fn select<R, F: FnOnce(&UserPreferences) -> R>(&self, selector: F) -> R {
        selector(&self.preferences)
    }

    /// Returns `true` once a display name has been set.
    #[inline]
    #[must_use]
    pub fn onboarding_complete(&self) -> bool {
        self.preferences.onboarding_complete()
    }
}
