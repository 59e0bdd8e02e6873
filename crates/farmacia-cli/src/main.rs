mod favorites;
mod output;
mod search;

use clap::{CommandFactory, Parser, Subcommand};
use farmacia_core::DEFAULT_LIMIT;
use tracing_subscriber::EnvFilter;

use crate::favorites::FavoritesCommands;
use crate::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "farmacia")]
#[command(about = "Farmácia Popular pharmacy directory")]
struct Cli {
    /// Override the API base URL from the environment
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List pharmacies, narrowing by state, city, and neighborhood
    Search {
        /// State abbreviation (e.g., MG)
        #[arg(long)]
        state: Option<String>,
        /// City name; requires --state
        #[arg(long)]
        city: Option<String>,
        /// Neighborhood name; requires --city
        #[arg(long)]
        neighborhood: Option<String>,
        /// Restore filters from a shared location such as `/?state=MG&city=BELO%20HORIZONTE`
        #[arg(long, conflicts_with_all = ["state", "city", "neighborhood"])]
        location: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// Manage favorite pharmacies
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = farmacia_core::load_client_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }

    match cli.command {
        Some(Commands::Search {
            state,
            city,
            neighborhood,
            location,
            page,
            limit,
        }) => {
            let args = SearchArgs {
                state,
                city,
                neighborhood,
                location,
                page,
                limit,
            };
            search::run_search(&config, args).await?;
        }
        Some(Commands::Favorites { command }) => {
            favorites::run_favorites(&config, command).await?;
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
