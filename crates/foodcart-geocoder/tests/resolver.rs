//! Integration tests for `AddressResolver` against a wiremock provider and an
//! in-memory geocode cache.

use std::collections::BTreeSet;
use std::str::FromStr;

use foodcart_core::{GeoPoint, GeocodeCache, MemoryGeocodeCache};
use foodcart_geocoder::{AddressResolver, GeocoderClient, GeocoderError, ResolveSummary};
use rust_decimal::Decimal;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> GeocoderClient {
    GeocoderClient::with_base_url(
        "test-key",
        5,
        "foodcart-test/0.1",
        &format!("{}/1.x", server.uri()),
    )
    .expect("client construction should not fail")
}

fn found(pos: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "response": { "GeoObjectCollection": { "featureMember": [
            { "GeoObject": { "Point": { "pos": pos } } }
        ] } }
    }))
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "response": { "GeoObjectCollection": { "featureMember": [] } }
    }))
}

async fn mock_address(server: &MockServer, address: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/1.x"))
        .and(query_param("geocode", address))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

fn addresses(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn point(lat: &str, lon: &str) -> GeoPoint {
    GeoPoint::new(Decimal::from_str(lat).unwrap(), Decimal::from_str(lon).unwrap())
}

#[tokio::test]
async fn resolves_each_address_once_and_memoizes_misses() {
    let server = MockServer::start().await;
    mock_address(&server, "Moscow, Red Square", found("37.618 55.751"), 1).await;
    mock_address(&server, "Atlantis", not_found(), 1).await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    let resolver = AddressResolver::new(&client, &cache);
    let wanted = addresses(&["Moscow, Red Square", "Atlantis"]);

    let first = resolver.resolve_missing(&wanted).await.unwrap();
    assert_eq!(
        first,
        ResolveSummary {
            requested: 2,
            already_cached: 0,
            resolved: 1,
            unresolved: 1,
        }
    );

    let second = resolver.resolve_missing(&wanted).await.unwrap();
    assert_eq!(second.already_cached, 2);
    assert_eq!(second.fetched(), 0);

    let red_square = cache.lookup("Moscow, Red Square").await.unwrap().unwrap();
    assert_eq!(red_square.coordinate, Some(point("55.751", "37.618")));
    let atlantis = cache.lookup("Atlantis").await.unwrap().unwrap();
    assert!(atlantis.coordinate.is_none());
}

#[tokio::test]
async fn cached_addresses_are_never_queried() {
    let server = MockServer::start().await;
    mock_address(&server, "Known street 1", found("1.0 1.0"), 0).await;
    mock_address(&server, "Gone street 2", found("1.0 1.0"), 0).await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    cache
        .store("Known street 1", Some(point("55.0", "37.0")))
        .await
        .unwrap();
    cache.store("Gone street 2", None).await.unwrap();

    let resolver = AddressResolver::new(&client, &cache);
    let summary = resolver
        .resolve_missing(&addresses(&["Known street 1", "Gone street 2"]))
        .await
        .unwrap();
    assert_eq!(summary.already_cached, 2);
    assert_eq!(summary.fetched(), 0);
}

#[tokio::test]
async fn provider_failure_aborts_but_keeps_earlier_results() {
    let server = MockServer::start().await;
    // Addresses are processed in sorted order: A, B, C.
    mock_address(&server, "A street", found("37.1 55.1"), 1).await;
    mock_address(&server, "B street", ResponseTemplate::new(500), 1).await;
    mock_address(&server, "C street", found("37.3 55.3"), 0).await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    let resolver = AddressResolver::new(&client, &cache).with_flush_batch_size(10);

    let err = resolver
        .resolve_missing(&addresses(&["A street", "B street", "C street"]))
        .await
        .unwrap_err();
    assert!(
        matches!(err, GeocoderError::Http(ref e) if e.status().map(|s| s.as_u16()) == Some(500)),
        "expected HTTP 500, got: {err:?}"
    );

    let a = cache.lookup("A street").await.unwrap().unwrap();
    assert_eq!(a.coordinate, Some(point("55.1", "37.1")));
    assert!(cache.lookup("B street").await.unwrap().is_none());
    assert!(cache.lookup("C street").await.unwrap().is_none());
}

#[tokio::test]
async fn small_flush_batches_store_everything() {
    let server = MockServer::start().await;
    mock_address(&server, "One", found("10.0 10.0"), 1).await;
    mock_address(&server, "Two", found("20.0 20.0"), 1).await;
    mock_address(&server, "Three", not_found(), 1).await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    let resolver = AddressResolver::new(&client, &cache).with_flush_batch_size(1);

    let summary = resolver
        .resolve_missing(&addresses(&["One", "Two", "Three"]))
        .await
        .unwrap();
    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn blank_addresses_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(not_found())
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    let resolver = AddressResolver::new(&client, &cache);

    let summary = resolver
        .resolve_missing(&addresses(&["", "   "]))
        .await
        .unwrap();
    assert_eq!(summary, ResolveSummary::default());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn resolve_one_issues_a_single_request() {
    let server = MockServer::start().await;
    mock_address(&server, "Moscow, Red Square", found("37.618 55.751"), 1).await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    let resolver = AddressResolver::new(&client, &cache);

    let first = resolver.resolve_one("Moscow, Red Square").await.unwrap();
    let second = resolver.resolve_one("Moscow, Red Square").await.unwrap();
    assert_eq!(first, Some(point("55.751", "37.618")));
    assert_eq!(first, second);
}

#[tokio::test]
async fn resolve_one_memoizes_unresolved_sentinel() {
    let server = MockServer::start().await;
    mock_address(&server, "Atlantis", not_found(), 1).await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    let resolver = AddressResolver::new(&client, &cache);

    assert!(resolver.resolve_one("Atlantis").await.unwrap().is_none());
    assert!(resolver.resolve_one("Atlantis").await.unwrap().is_none());
    assert!(cache.lookup("Atlantis").await.unwrap().is_some());
}

#[tokio::test]
async fn expired_deadline_keeps_places_fetched_before_it() {
    let server = MockServer::start().await;
    // Processed in sorted order: A, B, then C which outlives the deadline.
    mock_address(&server, "A street", found("37.1 55.1"), 1).await;
    mock_address(&server, "B street", not_found(), 1).await;
    mock_address(
        &server,
        "C street",
        found("37.3 55.3").set_delay(std::time::Duration::from_secs(3)),
        1,
    )
    .await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(800);
    let resolver = AddressResolver::new(&client, &cache)
        .with_flush_batch_size(20)
        .with_deadline(Some(deadline));

    let err = resolver
        .resolve_missing(&addresses(&["A street", "B street", "C street"]))
        .await
        .unwrap_err();
    assert!(
        matches!(err, GeocoderError::DeadlineExceeded),
        "expected deadline error, got: {err:?}"
    );

    assert_eq!(cache.len(), 2);
    let a = cache.lookup("A street").await.unwrap().unwrap();
    assert_eq!(a.coordinate, Some(point("55.1", "37.1")));
    assert!(cache.lookup("B street").await.unwrap().is_some());
    assert!(cache.lookup("C street").await.unwrap().is_none());
}

#[tokio::test]
async fn past_deadline_issues_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(not_found())
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let cache = MemoryGeocodeCache::new();
    let resolver =
        AddressResolver::new(&client, &cache).with_deadline(Some(std::time::Instant::now()));

    let err = resolver.resolve_one("A street").await.unwrap_err();
    assert!(matches!(err, GeocoderError::DeadlineExceeded));
    assert!(cache.is_empty());
}
