//! Order matching command handlers for the CLI.
//!
//! One invocation performs a full pass: collect every address the snapshot
//! needs, geocode the ones missing from the cache, then match and rank each
//! order. The pass either completes or fails as a whole.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Subcommand;
use foodcart_core::{
    addresses_to_resolve, match_orders, AppConfig, GeocodeCache, MemoryGeocodeCache,
    OrderMatches, Restaurant, Snapshot,
};
use foodcart_db::PgGeocodeCache;
use foodcart_geocoder::{AddressResolver, GeocoderClient, GeocoderError};

/// Sub-commands available under `orders`.
#[derive(Debug, Subcommand)]
pub enum OrdersCommands {
    /// Match every order in a snapshot to restaurants that stock all its products
    Match {
        /// YAML file with `restaurants`, `menu`, and `orders`
        #[arg(long)]
        snapshot: PathBuf,
        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Use a process-local geocode cache instead of the database
        #[arg(long)]
        in_memory: bool,
    },
}

/// Knobs for one matching pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MatchSettings {
    pub flush_batch_size: usize,
    /// `None` lets the pass run until it finishes or fails.
    pub deadline: Option<Duration>,
}

impl MatchSettings {
    pub(crate) fn from_app_config(config: &AppConfig) -> Self {
        Self {
            flush_batch_size: config.geocoder_flush_batch_size,
            deadline: config.match_deadline_secs.map(Duration::from_secs),
        }
    }
}

pub(crate) async fn run_orders(config: &AppConfig, command: OrdersCommands) -> anyhow::Result<()> {
    match command {
        OrdersCommands::Match {
            snapshot,
            json,
            in_memory,
        } => run_orders_match(config, &snapshot, json, in_memory).await,
    }
}

/// Load a snapshot, run one matching pass, and print the results.
///
/// # Errors
///
/// Returns an error if the snapshot is invalid, the database or provider is
/// unreachable, or the pass exceeds its deadline.
async fn run_orders_match(
    config: &AppConfig,
    snapshot_path: &Path,
    json: bool,
    in_memory: bool,
) -> anyhow::Result<()> {
    let snapshot = foodcart_core::load_snapshot(snapshot_path)?;
    tracing::info!(
        path = %snapshot_path.display(),
        restaurants = snapshot.restaurants.len(),
        menu_rows = snapshot.menu.len(),
        orders = snapshot.orders.len(),
        "snapshot loaded"
    );

    let client = crate::geocoder_client(config)?;
    let settings = MatchSettings::from_app_config(config);

    let matches = if in_memory {
        let cache = MemoryGeocodeCache::new();
        run_matching(&client, &cache, &snapshot, settings).await?
    } else {
        let pool = foodcart_db::connect_pool_from_config(config).await?;
        let cache = PgGeocodeCache::new(pool);
        run_matching(&client, &cache, &snapshot, settings).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        print!("{}", render_text(&matches, &snapshot.restaurants));
    }
    Ok(())
}

/// Resolve, match, and rank every order in `snapshot` under the optional
/// deadline in `settings`.
///
/// The deadline is enforced inside address resolution so that places fetched
/// before it passes are still written to the cache.
///
/// # Errors
///
/// Returns an error if geocoding or the cache fails, or if the deadline
/// expires. No partial results are returned.
pub(crate) async fn run_matching<C: GeocodeCache>(
    client: &GeocoderClient,
    cache: &C,
    snapshot: &Snapshot,
    settings: MatchSettings,
) -> anyhow::Result<Vec<OrderMatches>> {
    let deadline = settings.deadline.map(|limit| Instant::now() + limit);
    let addresses = addresses_to_resolve(&snapshot.orders, &snapshot.menu, &snapshot.restaurants);

    let resolver = AddressResolver::new(client, cache)
        .with_flush_batch_size(settings.flush_batch_size)
        .with_deadline(deadline);
    let summary = match resolver.resolve_missing(&addresses).await {
        Err(GeocoderError::DeadlineExceeded) => return Err(deadline_exceeded(settings)),
        result => result?,
    };
    tracing::info!(
        requested = summary.requested,
        fetched = summary.fetched(),
        unresolved = summary.unresolved,
        "addresses ready"
    );

    let lookup = cache.lookup_many(&addresses);
    let coordinates = match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline.into(), lookup)
            .await
            .map_err(|_| deadline_exceeded(settings))??,
        None => lookup.await?,
    };

    let matches = match_orders(
        &snapshot.orders,
        &snapshot.menu,
        &snapshot.restaurants,
        &coordinates,
    );

    let with_candidates = matches.iter().filter(|m| !m.results.is_empty()).count();
    tracing::info!(
        orders = matches.len(),
        with_candidates,
        "matching complete"
    );
    Ok(matches)
}

fn deadline_exceeded(settings: MatchSettings) -> anyhow::Error {
    let limit = settings.deadline.unwrap_or_default().as_secs_f64();
    tracing::error!(deadline_secs = limit, "matching pass abandoned");
    anyhow::anyhow!("matching pass did not finish within {limit:.1}s")
}

/// Human-readable rendering: one block per order, candidates nearest first.
pub(crate) fn render_text(matches: &[OrderMatches], restaurants: &[Restaurant]) -> String {
    let names: HashMap<i64, &str> = restaurants
        .iter()
        .map(|r| (r.id, r.name.as_str()))
        .collect();

    let mut out = String::new();
    for order in matches {
        out.push_str(&format!(
            "order #{} ({})\n",
            order.order_id, order.delivery_address
        ));
        if order.results.is_empty() {
            out.push_str("  no restaurant stocks every product\n");
            continue;
        }
        for result in &order.results {
            let name = names
                .get(&result.candidate_restaurant_id)
                .copied()
                .unwrap_or("unknown restaurant");
            out.push_str(&format!(
                "  #{:<6} {:<30} {}\n",
                result.candidate_restaurant_id, name, result.label
            ));
        }
    }
    out
}

#[cfg(test)]
#[path = "orders_test.rs"]
mod tests;
