//! `search` command: drives the cascading filter, then lists one page.

use std::sync::Arc;

use farmacia_client::{annotate, CascadingFilter, FavoritesStore, FileStorage, PharmacyApiClient, Tier};
use farmacia_core::{ClientConfig, DataUpdateInfo, FilterSelection, PageRequest};

use crate::output;

#[derive(Debug)]
pub(crate) struct SearchArgs {
    pub state: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub location: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl SearchArgs {
    fn requested(&self) -> FilterSelection {
        match &self.location {
            Some(location) => FilterSelection::from_query(location),
            None => FilterSelection::new(
                self.state.as_deref(),
                self.city.as_deref(),
                self.neighborhood.as_deref(),
            ),
        }
    }

    fn page_request(&self) -> PageRequest {
        PageRequest::from_params(
            Some(self.page.to_string().as_str()),
            Some(self.limit.to_string().as_str()),
        )
    }
}

/// Applies the requested filters tier by tier, waiting for each tier's
/// options before choosing the next one, then prints the matching page.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the listing request
/// fails. Option-list failures are reported as warnings and do not abort.
pub(crate) async fn run_search(config: &ClientConfig, args: SearchArgs) -> anyhow::Result<()> {
    let client = Arc::new(PharmacyApiClient::new(config)?);
    let requested = args.requested();

    let mut filter = CascadingFilter::new(Arc::clone(&client));
    filter.settle().await;

    let tiers = [
        (Tier::State, requested.state),
        (Tier::City, requested.city),
        (Tier::Neighborhood, requested.neighborhood),
    ];
    for (tier, value) in tiers {
        let Some(value) = value else { break };
        let accepted = match tier {
            Tier::State => filter.select_state(Some(value.clone())),
            Tier::City => filter.select_city(Some(value.clone())),
            Tier::Neighborhood => filter.select_neighborhood(Some(value.clone())),
        };
        if !accepted {
            eprintln!("{}", output::unknown_option(tier, &value));
            break;
        }
        filter.settle().await;
    }

    if let Some(warning) = filter.warning() {
        eprintln!("aviso: {warning}");
    }

    let page = client
        .list_pharmacies(filter.selection(), args.page_request())
        .await?;
    tracing::debug!(
        total = page.pagination.total,
        page = page.pagination.page,
        "listing fetched"
    );

    let store = FavoritesStore::open(FileStorage::new(&config.favorites_dir));
    if let Some(error) = store.error() {
        eprintln!("aviso: {error}");
    }

    println!("{}", filter.location());
    if let Some(next) = output::next_tier_options(&filter) {
        println!("{next}");
    }
    println!();
    let pagination = page.pagination.clone();
    print!("{}", output::pharmacy_table(&annotate(page.data, &store)));
    println!("{}", output::pagination_line(&pagination));
    println!(
        "{}",
        DataUpdateInfo::new(config.data_update_date.clone()).display_text()
    );

    Ok(())
}
