use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marquee::{
    CatalogListViewModel, Config, DataHub, InMemoryFavoriteStore, ListSettings, ListViewModel,
    PresentationState, TmdbClient,
};

const FIRST_PAGE_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marquee=info")),
        )
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    if config.api.api_key.is_empty() {
        warn!("No API key configured; set api.api_key or MARQUEE_API_KEY");
    }

    let client = TmdbClient::from_config(&config.api).context("Failed to create catalog client")?;
    let favorites = Arc::new(InMemoryFavoriteStore::new());
    let hub = Arc::new(DataHub::new(Arc::new(client), favorites));
    let _hub_listener = hub.start();

    let list = CatalogListViewModel::new(hub.clone(), ListSettings::from(&config));
    list.start();

    let query = std::env::args().nth(1);
    match query {
        Some(query) => {
            info!("Searching for {:?}", query);
            list.search(Some(query)).await;
        }
        None => {
            let mut counts = list.subscribe_item_count();
            tokio::time::timeout(FIRST_PAGE_TIMEOUT, async {
                while list.presentation_state() == PresentationState::Loading {
                    if counts.next().await.is_none() {
                        break;
                    }
                }
            })
            .await
            .context("Timed out waiting for the catalog")?;
        }
    }

    match list.presentation_state() {
        PresentationState::Error => anyhow::bail!("Catalog request failed, see log for details"),
        PresentationState::NoMatches => println!("No matches"),
        _ => {
            for index in 0..list.item_count() {
                if let Some(cell) = list.view_model_for_item(index) {
                    println!("{:>8}  {:<8}  {}", cell.id.get(), cell.year_label, cell.title);
                }
            }
        }
    }

    Ok(())
}
