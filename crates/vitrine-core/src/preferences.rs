// UI preferences persisted next to the credentials.

use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;
use vitrine_api::{KeyValueStore, THEME_KEY};

use crate::error::CoreError;
use crate::model::Theme;

pub struct Preferences {
    storage: Arc<dyn KeyValueStore>,
    theme: watch::Sender<Theme>,
}

impl Preferences {
    /// Read the stored theme; unreadable or unknown values fall back to light.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let theme = match storage.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::from_str(raw.trim()).unwrap_or_else(|_| {
                warn!(value = %raw, "unknown stored theme, using default");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "could not read stored theme");
                Theme::default()
            }
        };
        let (theme, _) = watch::channel(theme);
        Self { storage, theme }
    }

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn subscribe_theme(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), CoreError> {
        self.storage.set(THEME_KEY, &theme.to_string())?;
        self.theme.send_replace(theme);
        Ok(())
    }

    /// Switch light ↔ dark and persist. Returns the new theme.
    pub fn toggle_theme(&self) -> Result<Theme, CoreError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vitrine_api::MemoryStorage;

    #[test]
    fn theme_persists_under_app_theme_key() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        let prefs = Preferences::load(Arc::clone(&storage));
        assert_eq!(prefs.theme(), Theme::Light);

        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(storage.get("app_theme").unwrap().as_deref(), Some("dark"));

        let reloaded = Preferences::load(storage);
        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn garbage_theme_falls_back_to_light() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        storage.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(Preferences::load(storage).theme(), Theme::Light);
    }
}
