//! Write operations for the `places` table.

use std::collections::BTreeMap;

use foodcart_core::GeoPoint;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Insert or overwrite geocoding outcomes keyed by address.
///
/// Returns `(new_count, updated_count)`. `None` stores the unresolved marker
/// (both coordinates `NULL`). When the same address appears more than once in
/// `entries`, the last occurrence wins.
///
/// The batch is written with a single `INSERT … SELECT * FROM UNNEST(…)
/// ON CONFLICT` round trip; coordinates are cast to `NUMERIC[]` in SQL.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_places(
    pool: &PgPool,
    entries: &[(String, Option<GeoPoint>)],
) -> Result<(u64, u64), sqlx::Error> {
    // ON CONFLICT cannot touch the same row twice in one statement.
    let deduped: BTreeMap<&str, Option<GeoPoint>> = entries
        .iter()
        .map(|(address, coordinate)| (address.as_str(), *coordinate))
        .collect();
    if deduped.is_empty() {
        return Ok((0, 0));
    }

    let mut addresses: Vec<String> = Vec::with_capacity(deduped.len());
    let mut latitudes: Vec<Option<Decimal>> = Vec::with_capacity(deduped.len());
    let mut longitudes: Vec<Option<Decimal>> = Vec::with_capacity(deduped.len());

    for (address, coordinate) in deduped {
        addresses.push(address.to_owned());
        latitudes.push(coordinate.map(|p| p.latitude));
        longitudes.push(coordinate.map(|p| p.longitude));
    }

    let rows: Vec<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO places (address, latitude, longitude) \
         SELECT * FROM UNNEST($1::text[], $2::numeric[], $3::numeric[]) \
         ON CONFLICT (address) DO UPDATE SET \
             latitude    = EXCLUDED.latitude, \
             longitude   = EXCLUDED.longitude, \
             resolved_at = NOW(), \
             updated_at  = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&addresses)
    .bind(&latitudes)
    .bind(&longitudes)
    .fetch_all(pool)
    .await?;

    let new_count = rows.iter().filter(|&&is_new| is_new).count() as u64;
    let updated_count = rows.len() as u64 - new_count;

    Ok((new_count, updated_count))
}
