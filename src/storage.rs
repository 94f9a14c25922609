//! Durable client-side key/value storage.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;
use crate::theme::Theme;

/// String key/value store with the semantics of `window.localStorage`.
///
/// Both operations may fail: browsers throw when storage is disabled,
/// blocked by privacy settings or over quota.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local storage, used when the browser refuses `localStorage`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Reads the persisted theme, falling back to [`Theme::Modern`].
pub fn load_theme(storage: &dyn Storage, key: &str) -> Theme {
    match storage.get(key) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring persisted theme");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(err) => {
            tracing::warn!(%err, "could not read theme preference");
            Theme::default()
        }
    }
}

/// Persists `theme`. Failure is logged and otherwise ignored.
pub fn save_theme(storage: &dyn Storage, key: &str, theme: Theme) {
    if let Err(err) = storage.set(key, theme.as_str()) {
        tracing::warn!(%err, "could not save theme preference");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::BlockedStorage;

    #[test]
    fn missing_value_defaults_to_modern() {
        let storage = MemoryStorage::new();
        assert_eq!(load_theme(&storage, "portfolio-theme"), Theme::Modern);
    }

    #[test]
    fn round_trips_through_storage() {
        let storage = MemoryStorage::new();
        save_theme(&storage, "portfolio-theme", Theme::Retro);
        assert_eq!(
            storage.get("portfolio-theme").unwrap().as_deref(),
            Some("retro")
        );
        assert_eq!(load_theme(&storage, "portfolio-theme"), Theme::Retro);
    }

    #[test]
    fn garbage_value_defaults_to_modern() {
        let storage = MemoryStorage::new();
        storage.set("portfolio-theme", "sepia").unwrap();
        assert_eq!(load_theme(&storage, "portfolio-theme"), Theme::Modern);
    }

    #[test]
    fn blocked_storage_is_not_fatal() {
        let storage = BlockedStorage;
        save_theme(&storage, "portfolio-theme", Theme::Retro);
        assert_eq!(load_theme(&storage, "portfolio-theme"), Theme::Modern);
    }
}
