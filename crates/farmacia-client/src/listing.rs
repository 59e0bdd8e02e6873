//! Joins a page of pharmacies with the favorites set for display.

use farmacia_core::Pharmacy;
use serde::Serialize;

use crate::favorites::FavoritesStore;
use crate::storage::FavoritesStorage;

pub const ADDED_MESSAGE: &str = "Farmácia adicionada aos favoritos";
pub const REMOVED_MESSAGE: &str = "Farmácia removida dos favoritos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PharmacyListItem {
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    pub is_favorite: bool,
}

/// Marks each pharmacy with its favorite status, keeping listing order.
pub fn annotate<S: FavoritesStorage>(
    pharmacies: Vec<Pharmacy>,
    favorites: &FavoritesStore<S>,
) -> Vec<PharmacyListItem> {
    pharmacies
        .into_iter()
        .map(|pharmacy| PharmacyListItem {
            is_favorite: favorites.is_favorite(&pharmacy.cnpj),
            pharmacy,
        })
        .collect()
}

/// Feedback line for a toggle that left the pharmacy in `now_favorite`.
#[must_use]
pub fn toggle_message(now_favorite: bool) -> &'static str {
    if now_favorite {
        ADDED_MESSAGE
    } else {
        REMOVED_MESSAGE
    }
}
