//! `favorites` command handlers.

use std::sync::Arc;

use clap::Subcommand;
use farmacia_client::{
    annotate, toggle_message, FavoritePharmaciesLoader, FavoritesStore, FileStorage,
    PharmacyApiClient,
};
use farmacia_core::{ClientConfig, DataUpdateInfo};

use crate::output;

/// Sub-commands available under `favorites`.
#[derive(Debug, Subcommand)]
pub enum FavoritesCommands {
    /// Mark a pharmacy as favorite by CNPJ
    Add { cnpj: String },
    /// Remove a pharmacy from favorites
    Remove { cnpj: String },
    /// Flip the favorite status of a pharmacy
    Toggle { cnpj: String },
    /// Print the stored CNPJs
    List,
    /// Fetch and print full records for every favorite
    Show,
}

/// # Errors
///
/// `show` fails if the API client cannot be built or the lookup fails.
/// Persistence problems are printed as warnings and never fail the command.
pub(crate) async fn run_favorites(
    config: &ClientConfig,
    command: FavoritesCommands,
) -> anyhow::Result<()> {
    let mut store = FavoritesStore::open(FileStorage::new(&config.favorites_dir));
    let load_warning = store.error().map(ToString::to_string);
    if let Some(warning) = &load_warning {
        eprintln!("aviso: {warning}");
    }

    match command {
        FavoritesCommands::Add { cnpj } => {
            if store.add_favorite(&cnpj) {
                println!("{}", toggle_message(true));
            } else {
                println!("{cnpj} já está nos favoritos");
            }
        }
        FavoritesCommands::Remove { cnpj } => {
            if store.remove_favorite(&cnpj) {
                println!("{}", toggle_message(false));
            } else {
                println!("{cnpj} não está nos favoritos");
            }
        }
        FavoritesCommands::Toggle { cnpj } => {
            println!("{}", toggle_message(store.toggle_favorite(&cnpj)));
        }
        FavoritesCommands::List => {
            print!("{}", output::favorite_ids(&store.favorites()));
        }
        FavoritesCommands::Show => {
            let client = Arc::new(PharmacyApiClient::new(config)?);
            let mut loader = FavoritePharmaciesLoader::new(client);
            loader.load(store.favorites());
            let state = loader.settle().await.clone();
            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            if state.pharmacies.is_empty() {
                println!("Nenhuma farmácia favorita");
            } else {
                print!(
                    "{}",
                    output::pharmacy_table(&annotate(state.pharmacies, &store))
                );
            }
            println!(
                "{}",
                DataUpdateInfo::new(config.data_update_date.clone()).display_text()
            );
        }
    }

    // A failed write surfaces only after the mutation that triggered it.
    if let Some(error) = store.error() {
        if load_warning.as_deref() != Some(error) {
            eprintln!("aviso: {error}");
        }
    }

    Ok(())
}
