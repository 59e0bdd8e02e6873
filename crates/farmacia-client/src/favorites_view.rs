//! Loads full pharmacy records for the favorites set.

use std::future::Future;
use std::sync::Arc;

use farmacia_core::Pharmacy;
use tokio::task::JoinHandle;

use crate::client::PharmacyApiClient;
use crate::error::ClientError;

pub const LOAD_FAVORITES_FAILED: &str =
    "Erro ao carregar farmácias favoritas. Por favor, tente novamente.";

/// Resolves CNPJs to full records.
pub trait PharmacyLookup: Send + Sync + 'static {
    fn find_by_cnpjs(
        &self,
        cnpjs: Vec<String>,
    ) -> impl Future<Output = Result<Vec<Pharmacy>, ClientError>> + Send;
}

impl PharmacyLookup for PharmacyApiClient {
    async fn find_by_cnpjs(&self, cnpjs: Vec<String>) -> Result<Vec<Pharmacy>, ClientError> {
        self.pharmacies_by_cnpj(&cnpjs).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesViewState {
    pub pharmacies: Vec<Pharmacy>,
    pub error: Option<String>,
    pub loading: bool,
}

/// Holds at most one lookup in flight. Starting a new one, or dropping the
/// loader, aborts the previous request so its result is never applied.
pub struct FavoritePharmaciesLoader<L: PharmacyLookup> {
    lookup: Arc<L>,
    requested: Option<Vec<String>>,
    state: FavoritesViewState,
    in_flight: Option<JoinHandle<Result<Vec<Pharmacy>, ClientError>>>,
}

impl<L: PharmacyLookup> FavoritePharmaciesLoader<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self {
            lookup,
            requested: None,
            state: FavoritesViewState::default(),
            in_flight: None,
        }
    }

    /// Starts a lookup for `cnpjs`, superseding any in-flight one.
    ///
    /// An empty set resolves immediately to an empty list without a
    /// request. Must be called from within a tokio runtime.
    pub fn load(&mut self, cnpjs: Vec<String>) {
        self.abort();
        self.requested = Some(cnpjs.clone());
        self.state.error = None;

        if cnpjs.is_empty() {
            self.state.pharmacies.clear();
            self.state.loading = false;
            return;
        }

        tracing::debug!(count = cnpjs.len(), "loading favorite pharmacies");
        self.state.loading = true;
        let lookup = Arc::clone(&self.lookup);
        self.in_flight = Some(tokio::spawn(async move {
            lookup.find_by_cnpjs(cnpjs).await
        }));
    }

    /// Calls [`FavoritePharmaciesLoader::load`] only when `cnpjs` differs
    /// from the last requested set.
    pub fn sync_with(&mut self, cnpjs: &[String]) {
        if self.requested.as_deref() != Some(cnpjs) {
            self.load(cnpjs.to_vec());
        }
    }

    /// Waits for the in-flight lookup, if any, and applies its outcome.
    ///
    /// On failure the previous records are kept and `error` is set.
    pub async fn settle(&mut self) -> &FavoritesViewState {
        if let Some(handle) = self.in_flight.take() {
            match handle.await {
                Ok(Ok(pharmacies)) => {
                    self.state.pharmacies = pharmacies;
                    self.state.error = None;
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "failed to load favorite pharmacies");
                    self.state.error = Some(LOAD_FAVORITES_FAILED.to_string());
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    tracing::error!(error = %e, "favorites lookup task panicked");
                    self.state.error = Some(LOAD_FAVORITES_FAILED.to_string());
                }
            }
            self.state.loading = false;
        }
        &self.state
    }

    #[must_use]
    pub fn state(&self) -> &FavoritesViewState {
        &self.state
    }

    fn abort(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            tracing::debug!("aborting superseded favorites lookup");
            handle.abort();
        }
    }
}

impl<L: PharmacyLookup> Drop for FavoritePharmaciesLoader<L> {
    fn drop(&mut self) {
        self.abort();
    }
}
