use std::collections::{BTreeSet, HashMap};

use foodcart_core::{GeoPoint, GeocodeCache, PlaceRecord};
use sqlx::PgPool;

use super::read::{get_place, list_places_by_address};
use super::write::upsert_places;

/// [`GeocodeCache`] persisted in the `places` table. Entries survive across
/// process invocations.
#[derive(Debug, Clone)]
pub struct PgGeocodeCache {
    pool: PgPool,
}

impl PgGeocodeCache {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl GeocodeCache for PgGeocodeCache {
    type Error = sqlx::Error;

    async fn lookup(&self, address: &str) -> Result<Option<PlaceRecord>, Self::Error> {
        Ok(get_place(&self.pool, address)
            .await?
            .map(super::types::PlaceRow::into_record))
    }

    async fn lookup_many(
        &self,
        addresses: &BTreeSet<String>,
    ) -> Result<HashMap<String, Option<GeoPoint>>, Self::Error> {
        let wanted: Vec<String> = addresses.iter().cloned().collect();
        let rows = list_places_by_address(&self.pool, &wanted).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let coordinate = row.coordinate();
                (row.address, coordinate)
            })
            .collect())
    }

    async fn store_many(&self, entries: &[(String, Option<GeoPoint>)]) -> Result<(), Self::Error> {
        let (new_count, updated_count) = upsert_places(&self.pool, entries).await?;
        tracing::debug!(new_count, updated_count, "places upserted");
        Ok(())
    }
}
