//! Persisted UI preferences.

use serde::{Deserialize, Serialize};

use crate::storage::{LocalStore, keys};

/// Theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Preference accessors over local storage.
#[derive(Clone)]
pub struct Preferences {
    store: LocalStore,
}

impl Preferences {
    /// Wrap a local store.
    #[must_use]
    pub const fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// The stored theme, defaulting to light.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.store.get(keys::THEME).unwrap_or_default()
    }

    /// Persist a theme choice.
    pub fn set_theme(&self, theme: Theme) {
        self.store.set(keys::THEME, &theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_defaults_to_light() {
        let prefs = Preferences::new(LocalStore::in_memory());
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_theme_roundtrip_and_toggle() {
        let store = LocalStore::in_memory();
        let prefs = Preferences::new(store.clone());
        prefs.set_theme(prefs.theme().toggled());
        assert_eq!(prefs.theme(), Theme::Dark);

        // Survives a reload through the same backend.
        assert_eq!(Preferences::new(store).theme(), Theme::Dark);
    }

    #[test]
    fn test_corrupt_theme_falls_back_to_default() {
        let store = LocalStore::in_memory();
        store.set_raw("theme", "\"neon\"");
        assert_eq!(Preferences::new(store).theme(), Theme::Light);
    }
}
