use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::*;

#[derive(Debug, Default)]
struct FakeData {
    states: Vec<String>,
    cities: HashMap<String, Vec<String>>,
    neighborhoods: HashMap<(String, String), Vec<String>>,
    failing_cities: bool,
    /// City fetches for this state never resolve.
    hanging_state: Option<String>,
}

#[derive(Debug, Default)]
struct FakeSource {
    data: Mutex<FakeData>,
    calls: Mutex<Vec<String>>,
    hanging_dropped: Arc<AtomicBool>,
}

/// Flags when the future holding it is dropped (aborted).
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl FakeSource {
    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn update(&self, f: impl FnOnce(&mut FakeData)) {
        f(&mut self.data.lock().expect("data lock"));
    }
}

fn server_error() -> ClientError {
    ClientError::UnexpectedStatus {
        status: 500,
        url: "http://fake/api/pharmacies/cities".to_string(),
        message: Some("Error reading CSV file".to_string()),
    }
}

impl FilterOptionsSource for FakeSource {
    async fn states(&self) -> Result<Vec<String>, ClientError> {
        self.record("states".to_string());
        let states = self.data.lock().expect("data lock").states.clone();
        Ok(states)
    }

    async fn cities(&self, state: &str) -> Result<Vec<String>, ClientError> {
        self.record(format!("cities:{state}"));
        let (hang, fail, cities) = {
            let data = self.data.lock().expect("data lock");
            (
                data.hanging_state.as_deref() == Some(state),
                data.failing_cities,
                data.cities.get(state).cloned().unwrap_or_default(),
            )
        };
        if hang {
            let _flag = DropFlag(Arc::clone(&self.hanging_dropped));
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(server_error());
        }
        Ok(cities)
    }

    async fn neighborhoods(&self, city: &str, state: &str) -> Result<Vec<String>, ClientError> {
        self.record(format!("neighborhoods:{city}/{state}"));
        let neighborhoods = self
            .data
            .lock()
            .expect("data lock")
            .neighborhoods
            .get(&(city.to_string(), state.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(neighborhoods)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn source() -> Arc<FakeSource> {
    let source = FakeSource::default();
    source.update(|d| {
        d.states = strings(&["MG", "SP"]);
        d.cities
            .insert("MG".to_string(), strings(&["BELO HORIZONTE", "CONTAGEM"]));
        d.cities.insert("SP".to_string(), strings(&["CAMPINAS"]));
        d.neighborhoods.insert(
            ("BELO HORIZONTE".to_string(), "MG".to_string()),
            strings(&["CENTRO", "SAVASSI"]),
        );
        d.neighborhoods.insert(
            ("CONTAGEM".to_string(), "MG".to_string()),
            strings(&["ELDORADO"]),
        );
    });
    Arc::new(source)
}

/// Controller with MG / BELO HORIZONTE / CENTRO selected and every list
/// loaded.
async fn fully_selected(source: &Arc<FakeSource>) -> CascadingFilter<FakeSource> {
    let mut filter = CascadingFilter::new(Arc::clone(source));
    filter.settle().await;
    assert!(filter.select_state(Some("MG".to_string())));
    filter.settle().await;
    assert!(filter.select_city(Some("BELO HORIZONTE".to_string())));
    filter.settle().await;
    assert!(filter.select_neighborhood(Some("CENTRO".to_string())));
    filter
}

#[tokio::test]
async fn new_fetches_states_only() {
    let source = source();
    let mut filter = CascadingFilter::new(Arc::clone(&source));

    assert!(filter.is_loading(Tier::State));
    filter.settle().await;

    assert_eq!(filter.options(Tier::State), strings(&["MG", "SP"]).as_slice());
    assert!(filter.options(Tier::City).is_empty());
    assert!(!filter.is_city_enabled());
    assert!(!filter.is_neighborhood_enabled());
    assert_eq!(source.calls(), vec!["states".to_string()]);
    assert_eq!(filter.location(), "/");
}

#[tokio::test]
async fn selecting_state_loads_its_cities() {
    let source = source();
    let mut filter = CascadingFilter::new(Arc::clone(&source));
    filter.settle().await;

    assert!(filter.select_state(Some("MG".to_string())));
    assert!(filter.is_loading(Tier::City));
    assert!(!filter.is_city_enabled(), "disabled while cities load");

    filter.settle().await;

    assert_eq!(
        filter.options(Tier::City),
        strings(&["BELO HORIZONTE", "CONTAGEM"]).as_slice()
    );
    assert!(filter.is_city_enabled());
    assert!(!filter.is_neighborhood_enabled());
    assert_eq!(filter.location(), "/?state=MG");
}

#[tokio::test]
async fn neighborhood_fetch_is_scoped_to_city_and_state() {
    let source = source();
    let filter = fully_selected(&source).await;

    assert!(source
        .calls()
        .contains(&"neighborhoods:BELO HORIZONTE/MG".to_string()));
    assert_eq!(
        filter.options(Tier::Neighborhood),
        strings(&["CENTRO", "SAVASSI"]).as_slice()
    );
    assert_eq!(
        filter.location(),
        "/?state=MG&city=BELO%20HORIZONTE&neighborhood=CENTRO"
    );
}

#[tokio::test]
async fn changing_state_clears_downstream_tiers() {
    let source = source();
    let mut filter = fully_selected(&source).await;

    assert!(filter.select_state(Some("SP".to_string())));

    assert_eq!(filter.selection().state.as_deref(), Some("SP"));
    assert!(filter.selection().city.is_none());
    assert!(filter.selection().neighborhood.is_none());
    assert!(filter.options(Tier::City).is_empty());
    assert!(filter.options(Tier::Neighborhood).is_empty());

    filter.settle().await;
    assert_eq!(filter.options(Tier::City), strings(&["CAMPINAS"]).as_slice());
}

#[tokio::test]
async fn changing_city_clears_neighborhood_only() {
    let source = source();
    let mut filter = fully_selected(&source).await;

    assert!(filter.select_city(Some("CONTAGEM".to_string())));
    assert_eq!(filter.selection().state.as_deref(), Some("MG"));
    assert!(filter.selection().neighborhood.is_none());

    filter.settle().await;
    assert_eq!(
        filter.options(Tier::Neighborhood),
        strings(&["ELDORADO"]).as_slice()
    );
}

#[tokio::test]
async fn clear_city_cascades_to_neighborhood() {
    let source = source();
    let mut filter = fully_selected(&source).await;

    filter.clear_city();

    assert_eq!(filter.selection().state.as_deref(), Some("MG"));
    assert!(filter.selection().city.is_none());
    assert!(filter.selection().neighborhood.is_none());
    assert!(!filter.is_neighborhood_enabled());
    assert_eq!(filter.location(), "/?state=MG");
}

#[tokio::test]
async fn clear_state_resets_everything() {
    let source = source();
    let mut filter = fully_selected(&source).await;

    filter.clear_state();

    assert!(filter.selection().is_unset());
    assert!(!filter.is_city_enabled());
    assert_eq!(filter.options(Tier::State), strings(&["MG", "SP"]).as_slice());
}

#[tokio::test]
async fn city_is_ignored_without_state() {
    let source = source();
    let mut filter = CascadingFilter::new(Arc::clone(&source));
    filter.settle().await;

    assert!(!filter.select_city(Some("BELO HORIZONTE".to_string())));
    assert!(!filter.select_neighborhood(Some("CENTRO".to_string())));
    assert!(filter.selection().is_unset());
}

#[tokio::test]
async fn unknown_value_is_rejected_against_loaded_list() {
    let source = source();
    let mut filter = CascadingFilter::new(Arc::clone(&source));
    filter.settle().await;

    assert!(!filter.select_state(Some("RJ".to_string())));
    assert!(filter.selection().state.is_none());
    assert!(!filter.is_loading(Tier::City));
}

#[tokio::test]
async fn selection_adopts_option_spelling() {
    let source = source();
    let mut filter = CascadingFilter::new(Arc::clone(&source));
    filter.settle().await;

    assert!(filter.select_state(Some(" mg ".to_string())));
    assert_eq!(filter.selection().state.as_deref(), Some("MG"));
}

#[tokio::test]
async fn reselecting_with_other_case_keeps_lower_tiers() {
    let source = source();
    let mut filter = fully_selected(&source).await;
    let calls_before = source.calls().len();

    assert!(filter.select_state(Some("mg".to_string())));
    assert!(filter.select_city(Some("belo horizonte".to_string())));

    assert_eq!(filter.selection().state.as_deref(), Some("MG"));
    assert_eq!(filter.selection().city.as_deref(), Some("BELO HORIZONTE"));
    assert_eq!(filter.selection().neighborhood.as_deref(), Some("CENTRO"));
    assert_eq!(
        filter.options(Tier::Neighborhood),
        strings(&["CENTRO", "SAVASSI"]).as_slice()
    );
    assert_eq!(source.calls().len(), calls_before, "no refetch");
}

#[tokio::test]
async fn superseded_city_fetch_is_aborted() {
    let source = source();
    source.update(|d| d.hanging_state = Some("SP".to_string()));
    let mut filter = CascadingFilter::new(Arc::clone(&source));
    filter.settle().await;

    filter.select_state(Some("SP".to_string()));
    // Let the SP fetch start and park.
    tokio::task::yield_now().await;
    filter.select_state(Some("MG".to_string()));
    filter.settle().await;

    assert_eq!(
        filter.options(Tier::City),
        strings(&["BELO HORIZONTE", "CONTAGEM"]).as_slice()
    );
    assert_eq!(filter.selection().state.as_deref(), Some("MG"));

    for _ in 0..100 {
        if source.hanging_dropped.load(Ordering::SeqCst) {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(
        source.hanging_dropped.load(Ordering::SeqCst),
        "superseded fetch should have been aborted"
    );
}

#[tokio::test]
async fn refresh_clears_selection_that_disappeared() {
    let source = source();
    let mut filter = fully_selected(&source).await;

    source.update(|d| {
        d.neighborhoods.insert(
            ("BELO HORIZONTE".to_string(), "MG".to_string()),
            strings(&["SAVASSI"]),
        );
    });
    filter.refresh();
    filter.settle().await;

    assert_eq!(filter.selection().state.as_deref(), Some("MG"));
    assert_eq!(filter.selection().city.as_deref(), Some("BELO HORIZONTE"));
    assert!(filter.selection().neighborhood.is_none());
    assert_eq!(
        filter.options(Tier::Neighborhood),
        strings(&["SAVASSI"]).as_slice()
    );
}

#[tokio::test]
async fn refresh_without_state_clears_every_tier() {
    let source = source();
    let mut filter = fully_selected(&source).await;

    source.update(|d| d.states = strings(&["SP"]));
    filter.refresh();
    filter.settle().await;

    assert!(filter.selection().is_unset());
    assert!(filter.options(Tier::City).is_empty());
    assert!(filter.options(Tier::Neighborhood).is_empty());
}

#[tokio::test]
async fn failed_fetch_empties_tier_and_warns() {
    let source = source();
    source.update(|d| d.failing_cities = true);
    let mut filter = CascadingFilter::new(Arc::clone(&source));
    filter.settle().await;

    filter.select_state(Some("MG".to_string()));
    filter.settle().await;

    assert!(filter.options(Tier::City).is_empty());
    assert_eq!(filter.selection().state.as_deref(), Some("MG"));
    assert_eq!(filter.options(Tier::State), strings(&["MG", "SP"]).as_slice());
    assert_eq!(filter.warning(), Some("Erro ao carregar cidades"));

    filter.dismiss_warning();
    assert!(filter.warning().is_none());
}

#[tokio::test]
async fn restored_selection_survives_when_valid() {
    let source = source();
    let selection =
        FilterSelection::from_query("/?state=MG&city=BELO%20HORIZONTE&neighborhood=CENTRO");
    let mut filter = CascadingFilter::with_selection(Arc::clone(&source), selection.clone());

    assert!(filter.is_loading(Tier::Neighborhood));
    filter.settle().await;

    assert_eq!(filter.selection(), &selection);
    assert_eq!(
        filter.location(),
        "/?state=MG&city=BELO%20HORIZONTE&neighborhood=CENTRO"
    );
}

#[tokio::test]
async fn restored_selection_drops_orphan_tiers() {
    let source = source();
    let selection = FilterSelection::new(None, Some("BELO HORIZONTE"), Some("CENTRO"));
    let mut filter = CascadingFilter::with_selection(Arc::clone(&source), selection);
    filter.settle().await;

    assert!(filter.selection().is_unset());
    assert_eq!(source.calls(), vec!["states".to_string()]);
}
