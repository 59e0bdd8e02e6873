//! State → city → neighborhood filter controller.
//!
//! Each tier's option list is fetched on a spawned task. Changing an upstream
//! selection aborts every downstream fetch and starts a new one scoped to the
//! new selection, so a late response for a superseded selection can never
//! land. Results are applied by [`CascadingFilter::settle`].
//!
//! All fetch methods spawn onto the current tokio runtime and must be called
//! from within one.

use std::future::Future;
use std::sync::Arc;

use farmacia_core::FilterSelection;
use tokio::task::JoinHandle;

use crate::client::PharmacyApiClient;
use crate::error::ClientError;

/// Where the option lists come from.
pub trait FilterOptionsSource: Send + Sync + 'static {
    fn states(&self) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;

    fn cities(&self, state: &str)
        -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;

    fn neighborhoods(
        &self,
        city: &str,
        state: &str,
    ) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;
}

impl FilterOptionsSource for PharmacyApiClient {
    async fn states(&self) -> Result<Vec<String>, ClientError> {
        self.list_states().await
    }

    async fn cities(&self, state: &str) -> Result<Vec<String>, ClientError> {
        self.list_cities(state).await
    }

    async fn neighborhoods(&self, city: &str, state: &str) -> Result<Vec<String>, ClientError> {
        self.list_neighborhoods(city, state).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    State,
    City,
    Neighborhood,
}

impl Tier {
    const ALL: [Tier; 3] = [Tier::State, Tier::City, Tier::Neighborhood];

    fn below(self) -> &'static [Tier] {
        match self {
            Tier::State => &[Tier::City, Tier::Neighborhood],
            Tier::City => &[Tier::Neighborhood],
            Tier::Neighborhood => &[],
        }
    }

    fn load_failed_message(self) -> &'static str {
        match self {
            Tier::State => "Erro ao carregar estados",
            Tier::City => "Erro ao carregar cidades",
            Tier::Neighborhood => "Erro ao carregar bairros",
        }
    }
}

type Fetch = JoinHandle<Result<Vec<String>, ClientError>>;

#[derive(Debug, Default)]
struct TierState {
    options: Vec<String>,
    /// Set once a fetch for the current scope succeeded.
    loaded: bool,
    fetch: Option<Fetch>,
}

impl TierState {
    fn abort(&mut self) {
        if let Some(handle) = self.fetch.take() {
            handle.abort();
        }
    }

    fn reset(&mut self) {
        self.abort();
        self.options.clear();
        self.loaded = false;
    }
}

/// Keeps a [`FilterSelection`] consistent with the option lists the source
/// reports.
///
/// Invariants: city is set only when state is set; neighborhood only when
/// city is set; a selected value is always one of its tier's loaded options
/// (compared case-insensitively, with the option's spelling kept).
pub struct CascadingFilter<S: FilterOptionsSource> {
    source: Arc<S>,
    selection: FilterSelection,
    states: TierState,
    cities: TierState,
    neighborhoods: TierState,
    warning: Option<String>,
}

impl<S: FilterOptionsSource> CascadingFilter<S> {
    /// Creates a controller with nothing selected and starts the state list
    /// fetch.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_selection(source, FilterSelection::default())
    }

    /// Restores a selection (for example one parsed from a shared location)
    /// and fetches every tier it enables. Values that turn out not to exist
    /// are cleared on [`CascadingFilter::settle`].
    pub fn with_selection(source: Arc<S>, selection: FilterSelection) -> Self {
        let mut selection = FilterSelection::new(
            selection.state.as_deref(),
            selection.city.as_deref(),
            selection.neighborhood.as_deref(),
        );
        if selection.state.is_none() {
            selection.city = None;
        }
        if selection.city.is_none() {
            selection.neighborhood = None;
        }

        let mut filter = Self {
            source,
            selection,
            states: TierState::default(),
            cities: TierState::default(),
            neighborhoods: TierState::default(),
            warning: None,
        };
        filter.refresh();
        filter
    }

    /// Sets or clears the state. Clears city and neighborhood and fetches
    /// the cities of the new state.
    ///
    /// Returns `false` if the value is not among the loaded states.
    pub fn select_state(&mut self, state: Option<String>) -> bool {
        let state = normalize(state);
        if same_option(state.as_deref(), self.selection.state.as_deref()) {
            return true;
        }
        self.selection.state = state;
        self.reset_below(Tier::State);
        if self.selection.state.is_none() {
            return true;
        }
        if !self.accept(Tier::State) {
            return false;
        }
        self.start_fetch(Tier::City);
        true
    }

    /// Ignored (returns `false`) while no state is selected.
    pub fn select_city(&mut self, city: Option<String>) -> bool {
        if self.selection.state.is_none() {
            tracing::debug!("city selection ignored without a state");
            return false;
        }
        let city = normalize(city);
        if same_option(city.as_deref(), self.selection.city.as_deref()) {
            return true;
        }
        self.selection.city = city;
        self.reset_below(Tier::City);
        if self.selection.city.is_none() {
            return true;
        }
        if !self.accept(Tier::City) {
            return false;
        }
        self.start_fetch(Tier::Neighborhood);
        true
    }

    /// Ignored (returns `false`) while no city is selected.
    pub fn select_neighborhood(&mut self, neighborhood: Option<String>) -> bool {
        if self.selection.city.is_none() {
            tracing::debug!("neighborhood selection ignored without a city");
            return false;
        }
        self.selection.neighborhood = normalize(neighborhood);
        self.selection.neighborhood.is_none() || self.accept(Tier::Neighborhood)
    }

    pub fn clear_state(&mut self) {
        self.select_state(None);
    }

    pub fn clear_city(&mut self) {
        self.select_city(None);
    }

    pub fn clear_neighborhood(&mut self) {
        self.select_neighborhood(None);
    }

    /// Re-fetches every tier the current selection enables so server-side
    /// changes are picked up. Any fetch still in flight is superseded.
    pub fn refresh(&mut self) {
        self.start_fetch(Tier::State);
        if self.selection.state.is_some() {
            self.start_fetch(Tier::City);
        }
        if self.selection.city.is_some() {
            self.start_fetch(Tier::Neighborhood);
        }
    }

    /// Waits for in-flight fetches and applies them in tier order.
    ///
    /// A refreshed list that lacks the selected value clears that selection
    /// and everything below it. A failed fetch empties that tier's list and
    /// sets [`CascadingFilter::warning`].
    pub async fn settle(&mut self) {
        for tier in Tier::ALL {
            let Some(handle) = self.tier_mut(tier).fetch.take() else {
                continue;
            };
            match handle.await {
                Ok(Ok(options)) => self.apply_options(tier, options),
                Ok(Err(e)) => {
                    tracing::warn!(?tier, error = %e, "option fetch failed");
                    self.apply_failure(tier);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    tracing::error!(?tier, error = %e, "option fetch task panicked");
                    self.apply_failure(tier);
                }
            }
        }
    }

    #[must_use]
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    #[must_use]
    pub fn options(&self, tier: Tier) -> &[String] {
        &self.tier(tier).options
    }

    #[must_use]
    pub fn is_loading(&self, tier: Tier) -> bool {
        self.tier(tier).fetch.is_some()
    }

    #[must_use]
    pub fn is_city_enabled(&self) -> bool {
        self.selection.state.is_some() && !self.is_loading(Tier::City)
    }

    #[must_use]
    pub fn is_neighborhood_enabled(&self) -> bool {
        self.selection.city.is_some() && !self.is_loading(Tier::Neighborhood)
    }

    /// Shareable location for the current selection, `/` when unset.
    #[must_use]
    pub fn location(&self) -> String {
        self.selection.location()
    }

    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    fn tier(&self, tier: Tier) -> &TierState {
        match tier {
            Tier::State => &self.states,
            Tier::City => &self.cities,
            Tier::Neighborhood => &self.neighborhoods,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut TierState {
        match tier {
            Tier::State => &mut self.states,
            Tier::City => &mut self.cities,
            Tier::Neighborhood => &mut self.neighborhoods,
        }
    }

    fn selected_mut(&mut self, tier: Tier) -> &mut Option<String> {
        match tier {
            Tier::State => &mut self.selection.state,
            Tier::City => &mut self.selection.city,
            Tier::Neighborhood => &mut self.selection.neighborhood,
        }
    }

    /// Clears selections and option lists of every tier below `tier`.
    fn reset_below(&mut self, tier: Tier) {
        for &below in tier.below() {
            *self.selected_mut(below) = None;
            self.tier_mut(below).reset();
        }
    }

    /// Checks the selection of `tier` against its loaded options. Adopts the
    /// option's spelling on a match; clears the selection (and below) when
    /// the list is loaded and lacks it.
    fn accept(&mut self, tier: Tier) -> bool {
        if !self.tier(tier).loaded {
            return true;
        }
        let Some(selected) = self.selected_mut(tier).clone() else {
            return true;
        };
        let wanted = selected.to_uppercase();
        let found = self
            .tier(tier)
            .options
            .iter()
            .find(|o| o.to_uppercase() == wanted)
            .cloned();
        if let Some(canonical) = found {
            *self.selected_mut(tier) = Some(canonical);
            true
        } else {
            tracing::info!(?tier, value = %selected, "selection no longer available, clearing");
            *self.selected_mut(tier) = None;
            self.reset_below(tier);
            false
        }
    }

    fn apply_options(&mut self, tier: Tier, options: Vec<String>) {
        let state = self.tier_mut(tier);
        state.options = options;
        state.loaded = true;
        self.accept(tier);
    }

    fn apply_failure(&mut self, tier: Tier) {
        let state = self.tier_mut(tier);
        state.options.clear();
        state.loaded = false;
        self.warning = Some(tier.load_failed_message().to_string());
    }

    /// Spawns the fetch for `tier` scoped to the current selection,
    /// aborting any fetch already in flight for that tier.
    fn start_fetch(&mut self, tier: Tier) {
        let source = Arc::clone(&self.source);
        let handle: Fetch = match tier {
            Tier::State => tokio::spawn(async move { source.states().await }),
            Tier::City => {
                let Some(state) = self.selection.state.clone() else {
                    return;
                };
                tokio::spawn(async move { source.cities(&state).await })
            }
            Tier::Neighborhood => {
                let (Some(state), Some(city)) =
                    (self.selection.state.clone(), self.selection.city.clone())
                else {
                    return;
                };
                tokio::spawn(async move { source.neighborhoods(&city, &state).await })
            }
        };
        if let Some(previous) = self.tier_mut(tier).fetch.replace(handle) {
            tracing::debug!(?tier, "superseding in-flight option fetch");
            previous.abort();
        }
    }
}

impl<S: FilterOptionsSource> Drop for CascadingFilter<S> {
    fn drop(&mut self) {
        for tier in Tier::ALL {
            self.tier_mut(tier).abort();
        }
    }
}

/// Options compare the way the dataset filter does, ignoring case.
fn same_option(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.to_uppercase() == b.to_uppercase(),
        (None, None) => true,
        _ => false,
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "filters_test.rs"]
mod tests;
