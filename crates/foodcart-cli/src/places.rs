//! Geocode cache command handlers for the CLI.

use clap::Subcommand;
use foodcart_core::AppConfig;
use foodcart_db::{PgGeocodeCache, PlaceRow};
use foodcart_geocoder::AddressResolver;

/// Sub-commands available under `places`.
#[derive(Debug, Subcommand)]
pub enum PlacesCommands {
    /// List cached places
    List {
        /// Only show addresses the geocoder did not recognize
        #[arg(long)]
        unresolved: bool,
    },
    /// Geocode one address through the cache
    Resolve {
        /// Address exactly as it appears in orders or menus
        address: String,
    },
}

pub(crate) async fn run_places(config: &AppConfig, command: PlacesCommands) -> anyhow::Result<()> {
    let pool = foodcart_db::connect_pool_from_config(config).await?;
    match command {
        PlacesCommands::List { unresolved } => run_places_list(&pool, unresolved).await,
        PlacesCommands::Resolve { address } => run_places_resolve(config, pool, &address).await,
    }
}

/// Print cached places as a table, ordered by address.
///
/// # Errors
///
/// Returns an error if the database query fails.
async fn run_places_list(pool: &sqlx::PgPool, unresolved_only: bool) -> anyhow::Result<()> {
    let rows = foodcart_db::list_places(pool, unresolved_only).await?;

    if rows.is_empty() {
        if unresolved_only {
            println!("no unresolved places");
        } else {
            println!("no places cached; run `orders match` or `places resolve` first");
        }
        return Ok(());
    }

    println!("{}", format_place_header());
    for row in &rows {
        println!("{}", format_place_row(row));
    }
    Ok(())
}

/// Resolve one address, hitting the provider only on a cache miss.
///
/// # Errors
///
/// Returns an error if the API key is missing, the provider call fails, or
/// the cache cannot be read or written.
async fn run_places_resolve(
    config: &AppConfig,
    pool: sqlx::PgPool,
    address: &str,
) -> anyhow::Result<()> {
    if address.trim().is_empty() {
        anyhow::bail!("address must not be blank");
    }

    let client = crate::geocoder_client(config)?;
    let cache = PgGeocodeCache::new(pool);
    let resolver = AddressResolver::new(&client, &cache);

    match resolver.resolve_one(address).await? {
        Some(point) => println!("{address}: {point}"),
        None => println!("{address}: {}", foodcart_core::ORDER_ADDRESS_NOT_RECOGNIZED),
    }
    Ok(())
}

fn format_place_header() -> String {
    format!("{:<10}{:<11}{:<22}ADDRESS", "LAT", "LON", "RESOLVED AT")
}

fn format_place_row(row: &PlaceRow) -> String {
    let (lat, lon) = match row.coordinate() {
        Some(point) => (point.latitude.to_string(), point.longitude.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };
    format!(
        "{:<10}{:<11}{:<22}{}",
        lat,
        lon,
        row.resolved_at.format("%Y-%m-%d %H:%M UTC"),
        row.address
    )
}
