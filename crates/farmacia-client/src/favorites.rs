//! Persisted favorites set with a memory-only fallback.
//!
//! The store always works in memory. Persistence is best effort: the first
//! failed read or write flips the store to [`StorageAvailability::Unavailable`],
//! records a user-facing warning, and stops touching the backend for the
//! rest of the session.

use serde_json::Value;

use crate::storage::FavoritesStorage;

/// Storage slot holding the JSON array of favorite CNPJs.
pub const FAVORITES_KEY: &str = "farmacia-popular-favorites";

pub const LOAD_FAILED_MESSAGE: &str =
    "Não foi possível carregar seus favoritos. Eles serão salvos apenas durante esta sessão.";
pub const SAVE_FAILED_MESSAGE: &str =
    "Não foi possível salvar seus favoritos. Eles serão perdidos ao encerrar esta sessão.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAvailability {
    /// `load` has not run yet.
    Unknown,
    Available,
    Unavailable,
}

/// Ordered, duplicate-free set of favorite pharmacy identifiers.
#[derive(Debug)]
pub struct FavoritesStore<S: FavoritesStorage> {
    storage: S,
    favorites: Vec<String>,
    availability: StorageAvailability,
    error: Option<String>,
}

impl<S: FavoritesStorage> FavoritesStore<S> {
    /// Creates an empty, not yet loaded store. Mutations before
    /// [`FavoritesStore::load`] stay in memory.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            favorites: Vec::new(),
            availability: StorageAvailability::Unknown,
            error: None,
        }
    }

    /// Creates a store and loads it immediately.
    #[must_use]
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    /// Reads the persisted set once. Later calls are no-ops.
    ///
    /// A missing or blank slot yields the empty set. Anything that is not a
    /// JSON array of strings leaves the set empty and marks storage as
    /// unavailable, so the corrupt value is never overwritten.
    pub fn load(&mut self) {
        if self.availability != StorageAvailability::Unknown {
            return;
        }

        match self.storage.read(FAVORITES_KEY) {
            Ok(Some(raw)) if !raw.trim().is_empty() => match parse_favorites(&raw) {
                Ok(list) => {
                    tracing::debug!(count = list.len(), "loaded favorites");
                    self.favorites = list;
                    self.availability = StorageAvailability::Available;
                }
                Err(reason) => {
                    tracing::warn!(%reason, "stored favorites are malformed");
                    self.favorites.clear();
                    self.mark_unavailable(LOAD_FAILED_MESSAGE);
                }
            },
            Ok(_) => {
                self.availability = StorageAvailability::Available;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read favorites");
                self.favorites.clear();
                self.mark_unavailable(LOAD_FAILED_MESSAGE);
            }
        }
    }

    /// Adds `id` at the end of the set. Returns `false` if it was already
    /// present.
    pub fn add_favorite(&mut self, id: &str) -> bool {
        if self.is_favorite(id) {
            return false;
        }
        self.favorites.push(id.to_string());
        self.persist();
        true
    }

    /// Returns `false` if `id` was not present.
    pub fn remove_favorite(&mut self, id: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|f| f != id);
        if self.favorites.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Flips membership of `id` and returns the new membership.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        if self.remove_favorite(id) {
            false
        } else {
            self.add_favorite(id)
        }
    }

    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    /// Snapshot of the set in insertion order.
    #[must_use]
    pub fn favorites(&self) -> Vec<String> {
        self.favorites.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    #[must_use]
    pub fn availability(&self) -> StorageAvailability {
        self.availability
    }

    /// `false` only once persistence has failed.
    #[must_use]
    pub fn is_storage_available(&self) -> bool {
        self.availability != StorageAvailability::Unavailable
    }

    /// Sticky warning set by the first persistence failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        if self.availability != StorageAvailability::Available {
            return;
        }
        let result = serde_json::to_string(&self.favorites)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .write(FAVORITES_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            tracing::warn!(%error, "failed to save favorites");
            self.mark_unavailable(SAVE_FAILED_MESSAGE);
        }
    }

    fn mark_unavailable(&mut self, message: &str) {
        self.availability = StorageAvailability::Unavailable;
        if self.error.is_none() {
            self.error = Some(message.to_string());
        }
    }
}

/// Accepts only a JSON array of strings. Duplicates are dropped, keeping the
/// first occurrence.
fn parse_favorites(raw: &str) -> Result<Vec<String>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("not JSON: {e}"))?;
    let Value::Array(items) = value else {
        return Err("not an array".to_string());
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let Value::String(id) = item else {
            return Err("array contains a non-string element".to_string());
        };
        if !out.contains(&id) {
            out.push(id);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "favorites_test.rs"]
mod tests;
