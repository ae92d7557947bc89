//! Fills the geocode cache for addresses it has never seen.
//!
//! Every address is sent to the provider at most once for the lifetime of the
//! cache: misses are memoized as unresolved records. Provider failures and an
//! expired deadline abort the batch without retry, after flushing whatever was
//! already resolved.

use std::collections::BTreeSet;
use std::time::Instant;

use foodcart_core::{GeoPoint, GeocodeCache};

use crate::client::GeocoderClient;
use crate::error::GeocoderError;

/// Default number of resolved places buffered before a cache write.
pub const DEFAULT_FLUSH_BATCH_SIZE: usize = 20;

/// Counts from one [`AddressResolver::resolve_missing`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Distinct non-blank addresses asked for.
    pub requested: usize,
    /// Addresses that already had a cache record and were not queried.
    pub already_cached: usize,
    /// Addresses the provider resolved to a coordinate.
    pub resolved: usize,
    /// Addresses the provider did not recognize, now cached as unresolved.
    pub unresolved: usize,
}

impl ResolveSummary {
    /// Number of provider requests issued.
    #[must_use]
    pub fn fetched(&self) -> usize {
        self.resolved + self.unresolved
    }
}

pub struct AddressResolver<'a, C> {
    client: &'a GeocoderClient,
    cache: &'a C,
    flush_batch_size: usize,
    deadline: Option<Instant>,
}

impl<'a, C: GeocodeCache> AddressResolver<'a, C> {
    #[must_use]
    pub fn new(client: &'a GeocoderClient, cache: &'a C) -> Self {
        Self {
            client,
            cache,
            flush_batch_size: DEFAULT_FLUSH_BATCH_SIZE,
            deadline: None,
        }
    }

    /// Sets how many results are buffered per cache write. Zero is treated as one.
    #[must_use]
    pub fn with_flush_batch_size(mut self, flush_batch_size: usize) -> Self {
        self.flush_batch_size = flush_batch_size.max(1);
        self
    }

    /// Stops issuing provider requests at `deadline`. A request still in
    /// flight at that moment is abandoned; results obtained earlier are
    /// flushed before [`GeocoderError::DeadlineExceeded`] is returned.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Geocodes every address in `addresses` that has no cache record yet and
    /// stores the outcome, including "unresolved" for addresses the provider
    /// does not know. Blank addresses are skipped.
    ///
    /// Requests are issued sequentially.
    ///
    /// # Errors
    ///
    /// Returns the first provider error ([`GeocoderError::Http`],
    /// [`GeocoderError::Deserialize`], [`GeocoderError::MalformedPosition`])
    /// or [`GeocoderError::DeadlineExceeded`] after flushing results obtained
    /// before it, or
    /// [`GeocoderError::Cache`] if the cache cannot be read or written.
    pub async fn resolve_missing(
        &self,
        addresses: &BTreeSet<String>,
    ) -> Result<ResolveSummary, GeocoderError> {
        let wanted: BTreeSet<String> = addresses
            .iter()
            .filter(|a| !a.trim().is_empty())
            .cloned()
            .collect();

        let known = self.cache.lookup_many(&wanted).await.map_err(cache_error)?;
        let missing: Vec<&String> = wanted.iter().filter(|a| !known.contains_key(*a)).collect();

        let mut summary = ResolveSummary {
            requested: wanted.len(),
            already_cached: wanted.len() - missing.len(),
            ..ResolveSummary::default()
        };

        if missing.is_empty() {
            tracing::debug!(requested = summary.requested, "all addresses already cached");
            return Ok(summary);
        }

        tracing::info!(
            missing = missing.len(),
            already_cached = summary.already_cached,
            "geocoding addresses missing from cache"
        );

        let mut pending: Vec<(String, Option<GeoPoint>)> = Vec::with_capacity(self.flush_batch_size);
        for address in missing {
            let coordinate = match self.fetch(address).await {
                Ok(coordinate) => coordinate,
                Err(err) => {
                    tracing::error!(
                        %address,
                        error = %err,
                        pending = pending.len(),
                        "geocoding failed; aborting batch"
                    );
                    if let Err(flush_err) = self.flush(&mut pending).await {
                        tracing::warn!(
                            error = %flush_err,
                            "could not persist places resolved before the failure"
                        );
                    }
                    return Err(err);
                }
            };

            if let Some(point) = coordinate {
                tracing::debug!(%address, %point, "address resolved");
                summary.resolved += 1;
            } else {
                tracing::warn!(%address, "address not recognized by geocoder; caching as unresolved");
                summary.unresolved += 1;
            }

            pending.push((address.clone(), coordinate));
            if pending.len() >= self.flush_batch_size {
                self.flush(&mut pending).await?;
            }
        }
        self.flush(&mut pending).await?;

        tracing::info!(
            requested = summary.requested,
            already_cached = summary.already_cached,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            "address resolution complete"
        );
        Ok(summary)
    }

    /// Returns the cached outcome for one address, querying the provider and
    /// storing the result only when no record exists.
    ///
    /// # Errors
    ///
    /// Same as [`AddressResolver::resolve_missing`].
    pub async fn resolve_one(&self, address: &str) -> Result<Option<GeoPoint>, GeocoderError> {
        if let Some(record) = self.cache.lookup(address).await.map_err(cache_error)? {
            return Ok(record.coordinate);
        }
        if address.trim().is_empty() {
            return Ok(None);
        }

        let coordinate = self.fetch(address).await?;
        self.cache
            .store(address, coordinate)
            .await
            .map_err(cache_error)?;
        Ok(coordinate)
    }

    /// One provider request, bounded by the remaining time before the deadline.
    async fn fetch(&self, address: &str) -> Result<Option<GeoPoint>, GeocoderError> {
        let Some(deadline) = self.deadline else {
            return self.client.fetch_coordinates(address).await;
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(GeocoderError::DeadlineExceeded);
        }
        tokio::time::timeout(remaining, self.client.fetch_coordinates(address))
            .await
            .unwrap_or(Err(GeocoderError::DeadlineExceeded))
    }

    async fn flush(&self, pending: &mut Vec<(String, Option<GeoPoint>)>) -> Result<(), GeocoderError> {
        if pending.is_empty() {
            return Ok(());
        }
        self.cache.store_many(pending).await.map_err(cache_error)?;
        tracing::debug!(stored = pending.len(), "flushed places to cache");
        pending.clear();
        Ok(())
    }
}

fn cache_error<E>(err: E) -> GeocoderError
where
    E: std::error::Error + Send + Sync + 'static,
{
    GeocoderError::Cache(Box::new(err))
}
