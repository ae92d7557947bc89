//! Storage seam for geocoding results.
//!
//! [`GeocodeCache`] is injected wherever resolved coordinates are read or
//! written. The durable implementation lives in `foodcart-db`;
//! [`MemoryGeocodeCache`] keeps entries for the lifetime of the process.

use std::collections::{BTreeSet, HashMap};
use std::convert::Infallible;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::places::{GeoPoint, PlaceRecord};

/// Key/value store from address string to geocoding outcome.
///
/// Keys are compared by exact string equality. Entries are never evicted.
pub trait GeocodeCache: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the record for `address`, if one has been stored.
    fn lookup(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<PlaceRecord>, Self::Error>> + Send;

    /// Returns the cached outcome for every address in `addresses` that has a
    /// record. Addresses without a record are absent from the map.
    fn lookup_many(
        &self,
        addresses: &BTreeSet<String>,
    ) -> impl Future<Output = Result<HashMap<String, Option<GeoPoint>>, Self::Error>> + Send;

    /// Upserts all entries in a single write.
    fn store_many(
        &self,
        entries: &[(String, Option<GeoPoint>)],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Upserts a single entry. Storing `None` marks the address as unresolvable.
    fn store(
        &self,
        address: &str,
        coordinate: Option<GeoPoint>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let entry = [(address.to_owned(), coordinate)];
        async move { self.store_many(&entry).await }
    }
}

/// Process-local [`GeocodeCache`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryGeocodeCache {
    places: Mutex<HashMap<String, PlaceRecord>>,
}

impl MemoryGeocodeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, resolved or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GeocodeCache for MemoryGeocodeCache {
    type Error = Infallible;

    async fn lookup(&self, address: &str) -> Result<Option<PlaceRecord>, Self::Error> {
        let places = self.places.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(places.get(address).cloned())
    }

    async fn lookup_many(
        &self,
        addresses: &BTreeSet<String>,
    ) -> Result<HashMap<String, Option<GeoPoint>>, Self::Error> {
        let places = self.places.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(addresses
            .iter()
            .filter_map(|address| {
                places
                    .get(address)
                    .map(|record| (address.clone(), record.coordinate))
            })
            .collect())
    }

    async fn store_many(&self, entries: &[(String, Option<GeoPoint>)]) -> Result<(), Self::Error> {
        let now = Utc::now();
        let mut places = self.places.lock().unwrap_or_else(PoisonError::into_inner);
        for (address, coordinate) in entries {
            places.insert(
                address.clone(),
                PlaceRecord {
                    address: address.clone(),
                    coordinate: *coordinate,
                    resolved_at: now,
                },
            );
        }
        Ok(())
    }
}
