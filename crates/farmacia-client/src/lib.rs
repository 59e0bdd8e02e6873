//! Client-side pieces of the pharmacy directory: the HTTP API client, the
//! favorites store, the cascading filter controller, and the favorites
//! detail loader.

pub mod client;
pub mod error;
pub mod favorites;
pub mod favorites_view;
pub mod filters;
pub mod listing;
pub mod storage;
pub mod validate;

pub use client::PharmacyApiClient;
pub use error::{ClientError, StorageError};
pub use favorites::{FavoritesStore, StorageAvailability, FAVORITES_KEY};
pub use favorites_view::{FavoritePharmaciesLoader, FavoritesViewState, PharmacyLookup};
pub use filters::{CascadingFilter, FilterOptionsSource, Tier};
pub use listing::{annotate, toggle_message, PharmacyListItem};
pub use storage::{FavoritesStorage, FileStorage, MemoryStorage};
