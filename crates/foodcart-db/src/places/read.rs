//! Read operations for the `places` table.

use sqlx::PgPool;

use super::types::PlaceRow;

/// Fetch the row for an exact address string.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_place(pool: &PgPool, address: &str) -> Result<Option<PlaceRow>, sqlx::Error> {
    sqlx::query_as::<_, PlaceRow>(
        "SELECT id, address, latitude, longitude, resolved_at, created_at, updated_at \
         FROM places \
         WHERE address = $1",
    )
    .bind(address)
    .fetch_optional(pool)
    .await
}

/// Fetch every row whose address is in `addresses`. Addresses with no row are
/// simply absent from the result.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_places_by_address(
    pool: &PgPool,
    addresses: &[String],
) -> Result<Vec<PlaceRow>, sqlx::Error> {
    if addresses.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, PlaceRow>(
        "SELECT id, address, latitude, longitude, resolved_at, created_at, updated_at \
         FROM places \
         WHERE address = ANY($1::text[]) \
         ORDER BY address",
    )
    .bind(addresses)
    .fetch_all(pool)
    .await
}

/// List cached places ordered by address. With `unresolved_only`, only rows
/// the provider did not recognize are returned.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_places(pool: &PgPool, unresolved_only: bool) -> Result<Vec<PlaceRow>, sqlx::Error> {
    sqlx::query_as::<_, PlaceRow>(
        "SELECT id, address, latitude, longitude, resolved_at, created_at, updated_at \
         FROM places \
         WHERE ($1 = FALSE OR latitude IS NULL) \
         ORDER BY address",
    )
    .bind(unresolved_only)
    .fetch_all(pool)
    .await
}
